//! Training sessions
//!
//! Runs the crew several times and asks the operator for feedback on every
//! task output. Feedback given in one iteration is appended to the same
//! task's prompt in all later iterations.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::models::{CrewOutput, Pipeline, TrainingEntry, TrainingRecord};
use crate::domain::ports::Operator;
use crate::infrastructure::output::OutputError;
use crate::services::crew_runner::{CrewError, CrewRunner};

const FEEDBACK_QUESTION: &str = "Feedback for this output (leave empty to accept):";

/// Collects operator feedback over repeated crew runs
pub struct TrainingService {
    runner: CrewRunner,
    operator: Arc<dyn Operator>,
}

impl TrainingService {
    pub fn new(runner: CrewRunner, operator: Arc<dyn Operator>) -> Self {
        Self { runner, operator }
    }

    /// Run `iterations` training rounds and write the record to `filename`.
    #[instrument(skip(self, pipeline, inputs), fields(pipeline = %pipeline.name))]
    pub async fn train(
        &self,
        pipeline: &Pipeline,
        inputs: &serde_json::Value,
        iterations: u32,
        filename: &Path,
    ) -> Result<TrainingRecord, CrewError> {
        if iterations == 0 {
            return Err(CrewError::InvalidIterations);
        }
        if filename.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(CrewError::InvalidTrainingFile(filename.display().to_string()));
        }
        pipeline.validate()?;
        self.runner.agents().check_pipeline(pipeline)?;

        let mut record = TrainingRecord::new(pipeline.name.clone());

        for iteration in 1..=iterations {
            info!(iteration, iterations, "training iteration");
            let mut outputs = CrewOutput::new();

            for (index, step) in pipeline.steps.iter().enumerate() {
                let addendum = feedback_addendum(&record.feedback_for(&step.id));
                let output = self
                    .runner
                    .run_step(index, step, inputs, &outputs, addendum.as_deref())
                    .await?;

                self.operator
                    .present(
                        &format!("[{iteration}/{iterations}] {}", step.id),
                        &output.raw,
                    )
                    .await?;
                let answer = self.operator.ask(FEEDBACK_QUESTION).await?;
                let feedback = Some(answer.trim().to_string()).filter(|f| !f.is_empty());

                record.entries.push(TrainingEntry {
                    iteration,
                    task_id: step.id.clone(),
                    output: output.raw.clone(),
                    feedback,
                });
                outputs.push(output);
            }
            record.iterations = iteration;
        }

        write_record(&record, filename)?;
        info!(path = %filename.display(), entries = record.entries.len(), "training record written");
        Ok(record)
    }
}

/// Prompt suffix carrying earlier feedback, `None` when there is none.
pub fn feedback_addendum(feedback: &[&str]) -> Option<String> {
    if feedback.is_empty() {
        return None;
    }
    let mut addendum = String::from("\n\nHuman feedback from previous training iterations:");
    for item in feedback {
        addendum.push_str("\n- ");
        addendum.push_str(item);
    }
    Some(addendum)
}

fn write_record(record: &TrainingRecord, filename: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(record).map_err(|e| OutputError::Serialization {
        what: "training record".to_string(),
        message: e.to_string(),
    })?;

    if let Some(parent) = filename.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(filename, json).map_err(|source| OutputError::Io {
        path: filename.to_path_buf(),
        source,
    })
}
