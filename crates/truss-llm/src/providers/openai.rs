//! Plain chat completion provider (OpenAI-compatible `/chat/completions`).
//!
//! No structural guarantee: the reply may be prose around JSON, or no JSON at all.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::provider::{GenerationProvider, LLMError, Result};
use crate::providers::common::envelope;

pub struct OpenAIChatProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIChatProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k| !k.is_empty());
        self
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
        format!("{}/chat/completions", self.base_url)
    }
}

/// Single-turn, non-streaming chat body.
pub fn build_chat_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "stream": false,
    })
}

#[async_trait]
impl GenerationProvider for OpenAIChatProvider {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        let body = build_chat_body(&self.model, instruction);

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::Api { status, body: text });
        }

        let text = response.text().await?;
        Ok(envelope::raw_text(&text))
    }
}
