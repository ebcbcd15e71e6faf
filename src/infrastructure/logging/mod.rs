//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - pretty or JSON console output on stderr
//! - optional daily rolling JSON file
//! - one-time suppression of noisy dependency targets

pub mod logger;

pub use logger::{build_filter, LoggerImpl};
