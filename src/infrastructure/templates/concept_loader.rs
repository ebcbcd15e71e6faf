//! Course concept loader from YAML files

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::models::CourseConcept;

/// Errors raised while loading the course concept
#[derive(Debug, Error)]
pub enum ConceptError {
    #[error("Concept file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed concept file {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("Concept field '{0}' must not be empty")]
    MissingField(&'static str),

    #[error("Failed to read concept file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loader for the course concept
pub struct ConceptLoader;

impl ConceptLoader {
    /// Load and validate a concept file
    pub fn load(path: impl AsRef<Path>) -> Result<CourseConcept, ConceptError> {
        let path = path.as_ref();
        debug!("Loading course concept from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConceptError::NotFound(path.to_path_buf())
            } else {
                ConceptError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let concept = Self::from_yaml(&content).map_err(|err| match err {
            ConceptError::Malformed { message, .. } => ConceptError::Malformed {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        info!(topic = %concept.topic, "course concept loaded");
        Ok(concept)
    }

    /// Load the concept file, or fall back to the built-in concept when it
    /// does not exist. Malformed files are still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<CourseConcept, ConceptError> {
        match Self::load(path) {
            Err(ConceptError::NotFound(path)) => {
                info!(
                    "No concept file at {}, using the built-in concept",
                    path.display()
                );
                Ok(CourseConcept::default())
            }
            other => other,
        }
    }

    /// Parse and validate a concept from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<CourseConcept, ConceptError> {
        let concept: CourseConcept =
            serde_yaml::from_str(yaml).map_err(|e| ConceptError::Malformed {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;

        Self::validate(&concept)?;
        Ok(concept)
    }

    fn validate(concept: &CourseConcept) -> Result<(), ConceptError> {
        let required = [
            ("topic", &concept.topic),
            ("audience", &concept.audience),
            ("duration", &concept.duration),
            ("language", &concept.language),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConceptError::MissingField(name));
            }
        }
        Ok(())
    }
}
