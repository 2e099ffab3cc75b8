//! Exponential backoff for generation calls.
//!
//! Waits are `tokio::time::sleep`, so a retrying request suspends its task instead of
//! holding a worker thread.

use std::future::Future;
use std::time::Duration;

use crate::provider::{LLMError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: truss_core::config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(truss_core::config::DEFAULT_BACKOFF_BASE_SECS),
        }
    }
}

/// What a retry sequence ended with.
#[derive(Debug)]
pub enum RetryOutcome {
    Reply(String),
    /// Every attempt failed at the transport level. The sentinel stands in for the transport
    /// error so callers decide how to degrade.
    NoResponse {
        attempts: u32,
        timeouts: u32,
        last_error: String,
    },
    /// A failure that retrying cannot fix.
    Failed(LLMError),
}

impl RetryOutcome {
    /// Surface the outcome as a caller-visible result.
    pub fn into_result(self) -> Result<String> {
        match self {
            RetryOutcome::Reply(text) => Ok(text),
            RetryOutcome::NoResponse {
                attempts, timeouts, ..
            } if timeouts == attempts => Err(LLMError::UpstreamTimeout { attempts }),
            RetryOutcome::NoResponse {
                attempts,
                last_error,
                ..
            } => Err(LLMError::ServiceUnavailable {
                attempts,
                last_error,
            }),
            RetryOutcome::Failed(e) => Err(e),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// One attempt, no waiting.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay after the failed attempt with zero-based index `attempt`: `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `operation` until it succeeds, fails with a non-transport error, or attempts run
    /// out. `operation` receives the zero-based attempt index.
    pub async fn run<F, Fut>(&self, label: &str, mut operation: F) -> RetryOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut timeouts = 0;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            log::debug!("{}: attempt {}/{}", label, attempt + 1, max_attempts);

            match operation(attempt).await {
                Ok(text) => return RetryOutcome::Reply(text),
                Err(e) if e.is_transport() => {
                    if e.is_timeout() {
                        timeouts += 1;
                    }
                    last_error = e.to_string();

                    if attempt + 1 < max_attempts {
                        let delay = self.delay_for(attempt);
                        log::warn!(
                            "{}: attempt {}/{} failed: {}. Retrying in {:?}",
                            label,
                            attempt + 1,
                            max_attempts,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        log::warn!(
                            "{}: attempt {}/{} failed: {}",
                            label,
                            attempt + 1,
                            max_attempts,
                            e
                        );
                    }
                }
                Err(e) => return RetryOutcome::Failed(e),
            }
        }

        log::error!("{}: no response after {} attempt(s)", label, max_attempts);
        RetryOutcome::NoResponse {
            attempts: max_attempts,
            timeouts,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn api_error() -> LLMError {
        LLMError::Api {
            status: 503,
            body: "busy".to_string(),
        }
    }

    #[test]
    fn delays_double_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(20));
        assert_eq!(policy.delay_for(3), Duration::from_secs(80));
    }

    #[test]
    fn huge_attempt_index_saturates() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert_eq!(policy.delay_for(64), Duration::from_secs(10).saturating_mul(u32::MAX));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let outcome = policy
            .run("test", move |_| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(api_error())
                    } else {
                        Ok("done".to_string())
                    }
                }
            })
            .await;

        assert_eq!(outcome.into_result().unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_returns_sentinel() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let outcome = policy.run("test", |_| async { Err(api_error()) }).await;

        match outcome {
            RetryOutcome::NoResponse {
                attempts,
                timeouts,
                ref last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(timeouts, 0);
                assert!(last_error.contains("503"));
            }
            _ => panic!("Expected NoResponse"),
        }
        assert!(matches!(
            outcome.into_result(),
            Err(LLMError::ServiceUnavailable { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn all_timeouts_become_upstream_timeout() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let outcome = policy
            .run("test", |_| async {
                Err(LLMError::Timeout(Duration::from_millis(5)))
            })
            .await;

        assert!(matches!(
            outcome.into_result(),
            Err(LLMError::UpstreamTimeout { attempts: 2 })
        ));
    }

    #[tokio::test]
    async fn non_transport_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let outcome = policy
            .run("test", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(LLMError::EmptyDescription) }
            })
            .await;

        assert!(matches!(outcome, RetryOutcome::Failed(LLMError::EmptyDescription)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
