//! Domain ports (interfaces) for external collaborators.

pub mod llm_substrate;
pub mod operator;

pub use llm_substrate::{
    ExecutionParameters, LlmSubstrate, StopReason, SubstrateError,
    SubstrateRequest, SubstrateResponse, TokenUsage,
};
pub use operator::{Operator, OperatorError};
