pub use crate::provider::{FailureCategory, LLMError, Result};
