//! Domain errors for the masterclass pipeline.

use thiserror::Error;

/// Format a cycle path as a human-readable string: `a -> b -> a`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Domain-level errors raised while assembling or reading a pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task id in pipeline: {0}")]
    DuplicateTask(String),

    #[error("Pipeline '{0}' has no steps")]
    EmptyPipeline(String),

    #[error("Task '{task_id}' uses '{context_id}' as context but it is not declared earlier")]
    ContextNotDeclaredEarlier { task_id: String, context_id: String },

    #[error("Task dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<String>),

    #[error("No output recorded for task: {0}")]
    TaskOutputNotFound(String),

    #[error("Task index {index} out of range (pipeline has {len} completed tasks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
