use std::sync::Arc;
use std::time::Duration;

use crate::provider::{GenerationProvider, LLMError, Result};
use crate::retry::{RetryOutcome, RetryPolicy};

/// Sends instructions to a [`GenerationProvider`] under a per-call deadline and a retry policy.
///
/// Holds no state between calls; every attempt is exactly one outbound request.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn GenerationProvider>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn GenerationProvider>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            provider,
            retry,
            timeout,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the retry sequence and hand back its outcome, including the no-response sentinel.
    pub async fn query_outcome(&self, instruction: &str) -> RetryOutcome {
        self.retry
            .run(self.provider.name(), |_| self.attempt(instruction))
            .await
    }

    /// Raw text from the service, or `ServiceUnavailable` / `UpstreamTimeout` once retries are
    /// exhausted.
    pub async fn query(&self, instruction: &str) -> Result<String> {
        self.query_outcome(instruction).await.into_result()
    }

    async fn attempt(&self, instruction: &str) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.provider.generate(instruction)).await {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout(self.timeout)),
        }
    }
}
