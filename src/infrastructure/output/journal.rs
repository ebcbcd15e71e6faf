//! Run journal: JSON records of crew runs, used by `replay`.

use std::path::PathBuf;
use tracing::info;

use super::artifact_writer::{ArtifactWriter, OutputError};
use crate::domain::models::RunRecord;

/// Journal location relative to the output root
pub const LATEST_RUN_PATH: &str = ".runs/latest.json";

/// Reads and writes the latest run record below an output root
#[derive(Debug, Clone)]
pub struct RunJournal {
    writer: ArtifactWriter,
}

impl RunJournal {
    pub fn new(writer: ArtifactWriter) -> Self {
        Self { writer }
    }

    /// Store `record` as the latest run.
    pub fn record(&self, record: &RunRecord) -> Result<PathBuf, OutputError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| OutputError::Serialization {
            what: "run record".to_string(),
            message: e.to_string(),
        })?;
        let path = self.writer.write(LATEST_RUN_PATH, &json)?;
        info!(run_id = %record.run_id, path = %path.display(), "run journal updated");
        Ok(path)
    }

    /// Load the latest run, `None` if no run has been journaled yet.
    pub fn latest(&self) -> Result<Option<RunRecord>, OutputError> {
        let path = self.writer.resolve(LATEST_RUN_PATH)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = self.writer.read(LATEST_RUN_PATH)?;
        let record = serde_json::from_str(&json).map_err(|e| OutputError::Serialization {
            what: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CrewOutput, Pipeline, TaskOutput, TaskStep};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_latest_empty() {
        let dir = TempDir::new().unwrap();
        let journal = RunJournal::new(ArtifactWriter::new(dir.path()));
        assert!(journal.latest().unwrap().is_none());
    }

    #[test]
    fn test_record_then_latest() {
        let dir = TempDir::new().unwrap();
        let journal = RunJournal::new(ArtifactWriter::new(dir.path()));

        let mut outputs = CrewOutput::default();
        outputs.push(TaskOutput::new(
            "initial_outline",
            "content_developer",
            "outline",
            "initial_outline.md",
        ));
        let pipeline = Pipeline::new("crew").with_step(TaskStep::new(
            "initial_outline",
            "Draft an outline",
            "An outline",
            "content_developer",
        ));
        let record = RunRecord::new(
            pipeline,
            serde_json::json!({"topic": "Rust"}),
            Utc::now(),
            &outputs,
        );

        journal.record(&record).unwrap();
        let loaded = journal.latest().unwrap().unwrap();
        assert_eq!(loaded.run_id, record.run_id);
        assert_eq!(loaded.crew_output().text_at(0).unwrap(), "outline");
    }
}
