//! Operator adapters

pub mod operator;
pub mod scripted;

pub use operator::ConsoleOperator;
pub use scripted::ScriptedOperator;
