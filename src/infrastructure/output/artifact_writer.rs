//! Artifact writer
//!
//! Writes task results as files below a single output root.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while writing artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Invalid artifact path '{0}': must be relative and stay inside the output root")]
    InvalidArtifactPath(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },
}

/// Writes text artifacts below an output root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative artifact path against the root
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, OutputError> {
        let candidate = Path::new(relative);
        let valid = !relative.trim().is_empty()
            && candidate
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !valid {
            return Err(OutputError::InvalidArtifactPath(relative.to_string()));
        }
        Ok(self.root.join(candidate))
    }

    /// Write `content` to `relative`, creating parent directories and
    /// overwriting any existing file. Returns the written path.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf, OutputError> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&path, content).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(path)
    }

    /// Best-effort write: failures are logged and the run continues.
    pub fn persist(&self, relative: &str, content: &str) -> Option<PathBuf> {
        match self.write(relative, content) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(artifact = relative, error = %err, "failed to persist artifact");
                None
            }
        }
    }

    /// Read an artifact back
    pub fn read(&self, relative: &str) -> Result<String, OutputError> {
        let path = self.resolve(relative)?;
        std::fs::read_to_string(&path).map_err(|source| OutputError::Io { path, source })
    }
}
