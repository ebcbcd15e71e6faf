//! Agent and task catalogue sources
//!
//! The catalogues shipped in `config/` are compiled into the binary and used
//! whenever the configured file does not exist.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Built-in persona catalogue
pub const BUILTIN_AGENTS_YAML: &str = include_str!("../../../config/agents.yaml");

/// Built-in task catalogue
pub const BUILTIN_TASKS_YAML: &str = include_str!("../../../config/tasks.yaml");

/// Where a catalogue was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    File(String),
    BuiltIn,
}

/// Read a catalogue file, or the built-in text if the file does not exist
pub fn read_catalogue(path: impl AsRef<Path>, builtin: &'static str) -> Result<(String, CatalogueSource)> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("{} not found, using built-in catalogue", path.display());
        return Ok((builtin.to_string(), CatalogueSource::BuiltIn));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalogue file: {}", path.display()))?;
    Ok((content, CatalogueSource::File(path.display().to_string())))
}
