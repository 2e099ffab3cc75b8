//! One-shot generate provider (Ollama `/api/generate`).
//!
//! Requests JSON-constrained output with temperature pinned to 0.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::provider::{GenerationProvider, LLMError, Result};
use crate::providers::common::envelope;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: truss_core::config::DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

/// Non-streaming generate body with JSON output enforced.
pub fn build_generate_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "prompt": prompt,
        "format": "json",
        "stream": false,
        "options": { "temperature": 0 },
    })
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        let body = build_generate_body(&self.model, instruction);

        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::Api { status, body: text });
        }

        let text = response.text().await?;
        Ok(envelope::raw_text(&text))
    }
}
