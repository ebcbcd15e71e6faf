use super::errors::ClaudeApiError;
use super::types::{MessageRequest, MessageResponse};
use reqwest::{header, Client as ReqwestClient};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic HTTP client
#[derive(Debug, Clone)]
pub struct ClaudeClientConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Base URL for the API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClaudeClientConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout_secs: 300,
        }
    }
}

/// HTTP client for the Anthropic Messages API
///
/// One request at a time, no retries: a failed call is reported to the
/// pipeline, which aborts.
pub struct ClaudeClient {
    http_client: ReqwestClient,
    base_url: String,
    timeout_secs: u64,
}

impl ClaudeClient {
    /// Create a new client
    pub fn new(config: ClaudeClientConfig) -> Result<Self, ClaudeApiError> {
        let api_key_scrubbed = scrub_api_key(&config.api_key);

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            api_key = %api_key_scrubbed,
            "initializing Anthropic API client"
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| ClaudeApiError::InvalidRequest(format!("Invalid API key: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(ClaudeApiError::NetworkError)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Send a message request and parse the response
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn send_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, ClaudeApiError> {
        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClaudeApiError::Timeout
                } else {
                    ClaudeApiError::NetworkError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(ClaudeApiError::from_status(status, body));
        }

        let message_response: MessageResponse = response.json().await?;
        debug!(
            id = %message_response.id,
            input_tokens = message_response.usage.input_tokens,
            output_tokens = message_response.usage.output_tokens,
            "message completed"
        );

        Ok(message_response)
    }
}

/// Key prefix safe to log; the prefix is counted in characters.
fn scrub_api_key(api_key: &str) -> String {
    if api_key.chars().count() > 8 {
        format!("{}...[REDACTED]", api_key.chars().take(8).collect::<String>())
    } else {
        "[REDACTED]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_api_key() {
        assert_eq!(scrub_api_key("sk-ant-api03-secret"), "sk-ant-a...[REDACTED]");
        assert_eq!(scrub_api_key("short"), "[REDACTED]");
    }

    #[test]
    fn test_scrub_api_key_multibyte() {
        assert_eq!(scrub_api_key("sk-ключ-секрет"), "sk-ключ-...[REDACTED]");
        assert_eq!(scrub_api_key("ключключ"), "[REDACTED]");
        assert!(ClaudeClient::new(ClaudeClientConfig {
            api_key: "aéééééééé".to_string(),
            ..Default::default()
        })
        .is_err());
    }
}
