//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Anthropic Messages API client
//! - LLM substrates (Anthropic API, mock) and their registry
//! - Configuration management
//! - Logging infrastructure
//! - YAML sources for the concept and the agent/task catalogues
//! - Artifact persistence and the run journal
//! - Operator adapters (console, scripted)
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod claude;
pub mod config;
pub mod console;
pub mod logging;
pub mod output;
pub mod substrates;
pub mod templates;
