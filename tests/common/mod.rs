//! Common test utilities for integration tests
//!
//! Builds an application context on top of a scripted mock substrate and a
//! temporary output root.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use masterclass::cli::commands::AppContext;
use masterclass::domain::models::Config;
use masterclass::infrastructure::substrates::{MockSubstrate, SubstrateRegistry};

pub const CONCEPT_YAML: &str = "\
topic: Generative AI for Beginners
audience: Non-technical professionals
duration: One-day
";

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Config rooted in `dir` that uses the built-in catalogues
pub fn test_config(dir: &Path) -> Config {
    let concept_path = dir.join("concept.yaml");
    std::fs::write(&concept_path, CONCEPT_YAML).expect("Failed to write concept");

    let mut config = Config::default();
    config.output_dir = dir.join("outputs").display().to_string();
    config.concept_path = concept_path.display().to_string();
    config.agents_path = dir.join("no-agents.yaml").display().to_string();
    config.tasks_path = dir.join("no-tasks.yaml").display().to_string();
    config.llm.provider = "mock".to_string();
    config
}

pub fn test_context(config: &Config, mock: &MockSubstrate) -> AppContext {
    let substrates = SubstrateRegistry::with_substrate(Arc::new(mock.clone()));
    AppContext::with_substrates(config, Arc::new(substrates)).expect("Failed to build context")
}

pub fn output_path(config: &Config, relative: &str) -> PathBuf {
    Path::new(&config.output_dir).join(relative)
}

pub fn read_output(config: &Config, relative: &str) -> String {
    std::fs::read_to_string(output_path(config, relative))
        .unwrap_or_else(|e| panic!("missing artifact {relative}: {e}"))
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
