use serde::{Deserialize, Serialize};

/// Main configuration structure for masterclass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Root directory for generated artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Course concept YAML
    #[serde(default = "default_concept_path")]
    pub concept_path: String,

    /// Agent personas YAML; built-in personas are used if the file is missing
    #[serde(default = "default_agents_path")]
    pub agents_path: String,

    /// Task templates YAML; built-in tasks are used if the file is missing
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,

    /// Workflow configuration
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_output_dir() -> String {
    "outputs".to_string()
}

fn default_concept_path() -> String {
    "config/concept.yaml".to_string()
}

fn default_agents_path() -> String {
    "config/agents.yaml".to_string()
}

fn default_tasks_path() -> String {
    "config/tasks.yaml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concept_path: default_concept_path(),
            agents_path: default_agents_path(),
            tasks_path: default_tasks_path(),
            workflow: WorkflowConfig::default(),
            llm: LlmConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Outline and materials workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkflowConfig {
    /// Ask the operator to approve the outline before materials are generated
    #[serde(default = "default_true")]
    pub approval: bool,

    /// Keep numbered outline and feedback snapshots
    #[serde(default = "default_true")]
    pub persist_history: bool,

    /// Material tasks generated from the approved outline
    #[serde(default = "default_materials")]
    pub materials: Vec<String>,

    /// Tasks run by `kickoff`, `train`, `test` and `replay`
    #[serde(default = "default_crew_tasks")]
    pub crew_tasks: Vec<String>,
}

const fn default_true() -> bool {
    true
}

fn default_materials() -> Vec<String> {
    vec![
        "professor_guide".to_string(),
        "slide_deck".to_string(),
        "student_handout".to_string(),
    ]
}

fn default_crew_tasks() -> Vec<String> {
    vec![
        "initial_outline".to_string(),
        "outline_review".to_string(),
        "final_outline".to_string(),
        "professor_guide".to_string(),
        "slide_deck".to_string(),
        "student_handout".to_string(),
    ]
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            approval: true,
            persist_history: true,
            materials: default_materials(),
            crew_tasks: default_crew_tasks(),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Substrate id: "anthropic-api" or "mock"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Default model for personas without a pinned model
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (falls back to ANTHROPIC_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "anthropic-api".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Dependency targets whose diagnostics are silenced below error level
    #[serde(default = "default_suppressed_targets")]
    pub suppressed_targets: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_suppressed_targets() -> Vec<String> {
    ["hyper_util", "reqwest", "rustls", "h2"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            suppressed_targets: default_suppressed_targets(),
        }
    }
}
