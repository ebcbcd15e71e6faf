//! LLM Substrate Implementations
//!
//! Concrete implementations of the LlmSubstrate trait.

pub mod anthropic_api;
pub mod mock;
pub mod registry;

pub use anthropic_api::{AnthropicApiConfig, AnthropicApiSubstrate};
pub use mock::MockSubstrate;
pub use registry::SubstrateRegistry;
