use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Attempt exceeded the {0:?} deadline")]
    Timeout(Duration),

    #[error("Generation service unavailable after {attempts} attempt(s): {last_error}")]
    ServiceUnavailable { attempts: u32, last_error: String },

    #[error("Generation service timed out on all {attempts} attempt(s)")]
    UpstreamTimeout { attempts: u32 },

    #[error("Model did not return a parseable document")]
    UpstreamParse { raw: String },

    #[error("Description is required")]
    EmptyDescription,

    #[error("Configuration error: {0}")]
    Config(#[from] truss_core::ConfigError),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Caller-visible failure categories at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    ServiceDegraded,
    UpstreamTimeout,
    UnparseableResponse,
    InvalidRequest,
    Configuration,
}

impl LLMError {
    /// Connection errors, non-2xx statuses and deadline overruns. These are retried.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LLMError::Http(_) | LLMError::Api { .. } | LLMError::Timeout(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            LLMError::Timeout(_) => true,
            LLMError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            LLMError::Http(_)
            | LLMError::Api { .. }
            | LLMError::ServiceUnavailable { .. } => FailureCategory::ServiceDegraded,
            LLMError::Timeout(_) | LLMError::UpstreamTimeout { .. } => {
                FailureCategory::UpstreamTimeout
            }
            LLMError::UpstreamParse { .. } => FailureCategory::UnparseableResponse,
            LLMError::EmptyDescription => FailureCategory::InvalidRequest,
            LLMError::Config(_) => FailureCategory::Configuration,
        }
    }

    /// HTTP status a request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            FailureCategory::ServiceDegraded => 503,
            FailureCategory::UpstreamTimeout => 504,
            FailureCategory::UnparseableResponse => 502,
            FailureCategory::InvalidRequest => 400,
            FailureCategory::Configuration => 500,
        }
    }
}

/// A generation back-end. One call is one outbound request; retry and deadlines live in
/// [`crate::ModelClient`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Send the instruction and return the raw text the service produced.
    async fn generate(&self, instruction: &str) -> Result<String>;
}
