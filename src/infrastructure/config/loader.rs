use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::substrates::registry::KNOWN_SUBSTRATES;

/// Project config file merged over the defaults
pub const DEFAULT_CONFIG_FILE: &str = "masterclass.yaml";

/// Prefix for environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "MASTERCLASS_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Output directory cannot be empty")]
    EmptyOutputDir,

    #[error("Unknown llm provider: {0}. Must be one of: anthropic-api, mock")]
    UnknownProvider(String),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. masterclass.yaml in the working directory (optional)
    /// 3. Environment variables (MASTERCLASS_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_layers(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::load_layers(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Load from `--config` when given, otherwise from the default layers
    pub fn load_optional(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    fn load_layers(file: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.output_dir.trim().is_empty() {
            return Err(ConfigError::EmptyOutputDir);
        }

        if !KNOWN_SUBSTRATES.contains(&config.llm.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(config.llm.provider.clone()));
        }

        if config.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.llm.max_tokens));
        }

        if config.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.llm.timeout_secs));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.workflow.materials.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "workflow.materials must name at least one task".to_string(),
            ));
        }

        if config.workflow.crew_tasks.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "workflow.crew_tasks must name at least one task".to_string(),
            ));
        }

        Ok(())
    }
}
