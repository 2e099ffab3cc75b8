//! Helpers shared by the provider implementations.

pub mod envelope;
