//! Generation providers
//!
//! Both supported back-end shapes: a JSON-constrained one-shot generate call and a plain chat
//! completion.

pub(crate) mod common;
pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAIChatProvider;
