//! LLM Substrate Port
//!
//! Abstraction over the language-model backends (substrates) that answer
//! task prompts:
//! - Anthropic API (direct HTTP access)
//! - Mock (deterministic scripted answers for offline runs and tests)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to answer one task prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstrateRequest {
    /// Task step identifier, e.g. `initial_outline`
    pub task_id: String,

    /// Persona id the request is made for
    pub agent: String,

    /// Persona system prompt
    pub system_prompt: String,

    /// Fully built task prompt
    pub prompt: String,

    /// Execution parameters (model, temperature, etc.)
    pub parameters: ExecutionParameters,
}

impl SubstrateRequest {
    pub fn new(
        task_id: impl Into<String>,
        agent: impl Into<String>,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            agent: agent.into(),
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            parameters: ExecutionParameters::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.parameters.model = Some(model.into());
        self
    }
}

/// Parameters for controlling LLM execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParameters {
    /// Model to use; the substrate default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from a substrate.
#[derive(Debug, Clone)]
pub struct SubstrateResponse {
    pub task_id: String,

    /// Generated text
    pub content: String,

    /// `MaxTokens` means `content` is cut short
    pub stop_reason: StopReason,

    /// Token counts, when the substrate reports them
    pub usage: Option<TokenUsage>,
}

impl SubstrateResponse {
    pub fn text(task_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            content: content.into(),
            stop_reason: StopReason::EndTurn,
            usage: None,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Reason why execution stopped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    Other(String),
}

impl StopReason {
    pub fn from_api(reason: Option<&str>) -> Self {
        match reason {
            Some("end_turn" | "stop_sequence") | None => Self::EndTurn,
            Some("max_tokens") => Self::MaxTokens,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Error types for substrate operations
#[derive(Debug, thiserror::Error)]
pub enum SubstrateError {
    #[error("Substrate not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Execution timeout after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Substrate returned no text for task {0}")]
    EmptyResponse(String),
}

/// Port trait for LLM substrate implementations
///
/// # Implementations
///
/// - **AnthropicApiSubstrate**: Anthropic Messages API over HTTP
/// - **MockSubstrate**: scripted answers, records every request
#[async_trait]
pub trait LlmSubstrate: Send + Sync {
    /// Unique identifier for this substrate type, e.g. "anthropic-api"
    fn substrate_id(&self) -> &str;

    /// Answer one task prompt.
    ///
    /// This is a blocking call from the pipeline's point of view: the next
    /// task is not started until it returns.
    async fn execute(&self, request: SubstrateRequest) -> Result<SubstrateResponse, SubstrateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_api(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(StopReason::from_api(Some("stop_sequence")), StopReason::EndTurn);
        assert_eq!(StopReason::from_api(Some("max_tokens")), StopReason::MaxTokens);
        assert_eq!(
            StopReason::from_api(Some("refusal")),
            StopReason::Other("refusal".into())
        );
    }

    #[test]
    fn test_request_with_model() {
        let request = SubstrateRequest::new("t", "a", "sys", "prompt").with_model("m");
        assert_eq!(request.parameters.model.as_deref(), Some("m"));
    }
}
