//! Artifact persistence below the output root

pub mod artifact_writer;
pub mod journal;

pub use artifact_writer::{ArtifactWriter, OutputError};
pub use journal::{RunJournal, LATEST_RUN_PATH};
