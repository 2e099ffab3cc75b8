//! Provider Factory
//!
//! Builds a [`ModelClient`] from configuration.

use std::sync::Arc;

use truss_core::{BackendKind, Config};

use crate::client::ModelClient;
use crate::provider::GenerationProvider;
use crate::providers::{OllamaProvider, OpenAIChatProvider};
use crate::retry::RetryPolicy;

/// Available backend names
pub const AVAILABLE_BACKENDS: &[&str] = &["generate", "chat"];

/// Create the provider for the configured backend.
pub fn create_provider(config: &Config) -> Arc<dyn GenerationProvider> {
    let base_url = config.backend_base_url();
    match config.backend {
        BackendKind::Generate => {
            Arc::new(OllamaProvider::new(&config.model).with_base_url(base_url))
        }
        BackendKind::Chat => {
            let mut provider = OpenAIChatProvider::new(&config.model).with_base_url(base_url);
            if let Some(api_key) = &config.api_key {
                provider = provider.with_api_key(api_key);
            }
            Arc::new(provider)
        }
    }
}

/// Retry policy for the configured backend. The generate backend constrains its output and
/// is called once; the chat backend retries with exponential backoff.
pub fn retry_policy_for(config: &Config) -> RetryPolicy {
    match config.backend {
        BackendKind::Generate => RetryPolicy::single_attempt(),
        BackendKind::Chat => RetryPolicy::new(config.max_attempts(), config.backoff_base()),
    }
}

pub fn create_client(config: &Config) -> ModelClient {
    log::info!(
        "Using {:?} backend at {} (model {})",
        config.backend,
        config.backend_base_url(),
        config.model
    );
    if config.backend == BackendKind::Chat && config.api_key.is_none() {
        log::debug!("No API key configured for chat backend, sending unauthenticated requests");
    }

    ModelClient::new(
        create_provider(config),
        retry_policy_for(config),
        config.request_timeout(),
    )
}
