//! truss-llm - language-model path of the truss extraction pipeline
//!
//! Prompt rendering, generation providers with retry and deadlines, tolerant document
//! extraction, and the [`TrussPipeline`] that ends in the canonical model.

pub mod client;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod provider_factory;
pub mod providers;
pub mod retry;

pub use client::ModelClient;
pub use extract::extract;
pub use pipeline::TrussPipeline;
pub use prompt::build_prompt;
pub use provider::{FailureCategory, GenerationProvider, LLMError, Result};
pub use provider_factory::{create_client, create_provider};
pub use providers::{OllamaProvider, OpenAIChatProvider};
pub use retry::{RetryOutcome, RetryPolicy};
