//! Substrate Registry
//!
//! Builds the configured LLM substrate and routes task prompts to it.

use crate::domain::models::Config;
use crate::domain::ports::{LlmSubstrate, SubstrateError, SubstrateRequest, SubstrateResponse};
use std::sync::Arc;
use tracing::debug;

use super::anthropic_api::AnthropicApiConfig;
use super::{AnthropicApiSubstrate, MockSubstrate};

/// Substrate ids accepted in `llm.provider`.
pub const KNOWN_SUBSTRATES: &[&str] = &["anthropic-api", "mock"];

/// Registry for the configured LLM substrate
pub struct SubstrateRegistry {
    /// Substrate used for every request
    substrate: Arc<dyn LlmSubstrate>,
}

impl SubstrateRegistry {
    /// Create a registry holding the substrate named by `llm.provider`.
    ///
    /// # Errors
    /// Returns an error for an unknown provider or when the Anthropic API
    /// substrate has no key.
    pub fn from_config(config: &Config) -> Result<Self, SubstrateError> {
        let llm = &config.llm;
        let substrate: Arc<dyn LlmSubstrate> = match llm.provider.as_str() {
            "anthropic-api" => {
                let api_config = AnthropicApiConfig {
                    api_key: llm
                        .api_key
                        .clone()
                        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                        .unwrap_or_default(),
                    model: llm.model.clone(),
                    base_url: llm.base_url.clone(),
                    max_tokens: llm.max_tokens,
                    temperature: llm.temperature,
                    timeout_secs: llm.timeout_secs,
                };
                Arc::new(AnthropicApiSubstrate::new(api_config)?)
            }
            "mock" => Arc::new(MockSubstrate::new()),
            other => {
                return Err(SubstrateError::InvalidConfig(format!(
                    "Unknown llm provider '{other}'. Known providers: {}",
                    KNOWN_SUBSTRATES.join(", ")
                )))
            }
        };

        debug!(provider = %llm.provider, "substrate initialized");
        Ok(Self::with_substrate(substrate))
    }

    /// Create a registry around an already built substrate.
    pub fn with_substrate(substrate: Arc<dyn LlmSubstrate>) -> Self {
        Self { substrate }
    }

    /// Id of the substrate every task is sent to.
    pub fn substrate_id(&self) -> &str {
        self.substrate.substrate_id()
    }

    /// Execute a request on the configured substrate.
    pub async fn execute(&self, request: SubstrateRequest) -> Result<SubstrateResponse, SubstrateError> {
        self.substrate.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> Config {
        let mut config = Config::default();
        config.llm.provider = "mock".to_string();
        config
    }

    #[test]
    fn test_registry_creation() {
        let registry = SubstrateRegistry::from_config(&mock_config()).unwrap();
        assert_eq!(registry.substrate_id(), "mock");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = mock_config();
        config.llm.provider = "gpt".to_string();
        let result = SubstrateRegistry::from_config(&config);
        assert!(matches!(result, Err(SubstrateError::InvalidConfig(_))));
    }

    #[test]
    fn test_anthropic_with_explicit_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        let registry = SubstrateRegistry::from_config(&config).unwrap();
        assert_eq!(registry.substrate_id(), "anthropic-api");
    }

    #[tokio::test]
    async fn test_execute_routes_to_substrate() {
        let registry = SubstrateRegistry::from_config(&mock_config()).unwrap();
        let response = registry
            .execute(SubstrateRequest::new("outline", "writer", "", "prompt"))
            .await
            .unwrap();
        assert_eq!(response.task_id, "outline");
        assert_eq!(response.content, "[outline] mock answer from writer");
    }
}
