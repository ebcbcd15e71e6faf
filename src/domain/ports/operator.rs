//! Operator port - the human in the loop.
//!
//! The approval loop and training sessions are the only places that wait
//! for a person. Production wires the console; tests script the answers.

use async_trait::async_trait;

/// Errors raised while talking to the operator.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// Input stream closed (EOF) or no more scripted answers
    #[error("Operator input closed")]
    InputClosed,

    #[error("Failed to read operator input: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of operator answers.
#[async_trait]
pub trait Operator: Send + Sync {
    /// Show `content` (an outline or a task output) to the operator.
    async fn present(&self, title: &str, content: &str) -> Result<(), OperatorError>;

    /// Ask a question and wait for one line of input.
    async fn ask(&self, question: &str) -> Result<String, OperatorError>;
}
