//! Anthropic API Substrate
//!
//! Answers task prompts through the Anthropic Messages API.
//! Requires an API key (from config or the ANTHROPIC_API_KEY env var).

use crate::domain::ports::{
    LlmSubstrate, StopReason, SubstrateError, SubstrateRequest, SubstrateResponse,
    TokenUsage,
};
use crate::infrastructure::claude::{
    ClaudeApiError, ClaudeClient, ClaudeClientConfig, Message, MessageRequest,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Configuration for the Anthropic API substrate
#[derive(Debug, Clone)]
pub struct AnthropicApiConfig {
    /// API key (required)
    pub api_key: String,

    /// Model used when a request does not pin one
    pub model: String,

    /// Base URL for API (for testing/proxies)
    pub base_url: String,

    /// Maximum tokens per answer
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnthropicApiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            temperature: None,
            timeout_secs: 300,
        }
    }
}

/// Anthropic API substrate implementation
pub struct AnthropicApiSubstrate {
    client: ClaudeClient,
    config: AnthropicApiConfig,
}

impl AnthropicApiSubstrate {
    /// Create a new Anthropic API substrate
    pub fn new(config: AnthropicApiConfig) -> Result<Self, SubstrateError> {
        if config.api_key.trim().is_empty() {
            return Err(SubstrateError::NotConfigured(
                "ANTHROPIC_API_KEY is not set (add it to the environment or a .env file)"
                    .to_string(),
            ));
        }

        let client = ClaudeClient::new(ClaudeClientConfig {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
        .map_err(|e| {
            SubstrateError::InvalidConfig(format!("Failed to create Anthropic API client: {e}"))
        })?;

        Ok(Self { client, config })
    }

    /// Build the Messages API request from a substrate request
    fn to_message_request(&self, request: &SubstrateRequest) -> MessageRequest {
        let system = if request.system_prompt.trim().is_empty() {
            None
        } else {
            Some(request.system_prompt.clone())
        };

        MessageRequest {
            model: request
                .parameters
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: vec![Message::user(request.prompt.clone())],
            max_tokens: request.parameters.max_tokens.unwrap_or(self.config.max_tokens),
            system,
            temperature: request.parameters.temperature.or(self.config.temperature),
        }
    }

    /// Convert ClaudeApiError to SubstrateError
    fn convert_error(&self, err: ClaudeApiError) -> SubstrateError {
        match err {
            ClaudeApiError::InvalidApiKey => {
                SubstrateError::AuthError("Invalid API key".to_string())
            }
            ClaudeApiError::Forbidden(msg) => SubstrateError::AuthError(msg),
            ClaudeApiError::RateLimitExceeded => {
                SubstrateError::RateLimitExceeded("HTTP 429 from Anthropic API".to_string())
            }
            ClaudeApiError::NetworkError(e) => SubstrateError::NetworkError(e.to_string()),
            ClaudeApiError::Timeout => SubstrateError::Timeout(self.client.timeout_secs()),
            other => SubstrateError::ExecutionFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl LlmSubstrate for AnthropicApiSubstrate {
    fn substrate_id(&self) -> &str {
        "anthropic-api"
    }

    #[instrument(skip(self, request), fields(task_id = %request.task_id, agent = %request.agent))]
    async fn execute(&self, request: SubstrateRequest) -> Result<SubstrateResponse, SubstrateError> {
        let message_request = self.to_message_request(&request);
        debug!(model = %message_request.model, "sending task prompt");

        let response = self
            .client
            .send_message(&message_request)
            .await
            .map_err(|e| self.convert_error(e))?;

        // A response without text is an error, never an empty artifact.
        let content = response
            .text()
            .ok_or_else(|| SubstrateError::EmptyResponse(request.task_id.clone()))?;

        debug!(model = %response.model, message_id = %response.id, "task prompt answered");

        Ok(SubstrateResponse {
            task_id: request.task_id,
            content,
            stop_reason: StopReason::from_api(response.stop_reason.as_deref()),
            usage: Some(TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            }),
        })
    }
}
