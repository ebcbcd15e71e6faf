//! Crew evaluation (`test` command)
//!
//! Runs the crew with every request pinned to one model and has the
//! evaluator persona score each task output from 1 to 10.

use tracing::{info, instrument};

use crate::domain::models::{CrewOutput, Pipeline, TaskStep, TestReport};
use crate::services::crew_runner::{CrewError, CrewRunner};

/// Step the evaluator runs for every task output.
pub const EVALUATION_TASK: &str = "evaluate_output";

/// Scores crew outputs over repeated runs
pub struct EvaluationService {
    runner: CrewRunner,
    evaluation_step: TaskStep,
}

impl EvaluationService {
    /// `runner` is used unpinned for the evaluator; the crew itself runs on
    /// a copy pinned to the model under test.
    pub fn new(runner: CrewRunner, evaluation_step: TaskStep) -> Self {
        Self {
            runner,
            evaluation_step,
        }
    }

    #[instrument(skip(self, pipeline, inputs), fields(pipeline = %pipeline.name))]
    pub async fn test(
        &self,
        pipeline: &Pipeline,
        inputs: &serde_json::Value,
        iterations: u32,
        model: &str,
    ) -> Result<TestReport, CrewError> {
        if iterations == 0 {
            return Err(CrewError::InvalidIterations);
        }

        let crew = self.runner.clone().with_model_override(model);
        let mut report = TestReport::new(model, iterations);

        for iteration in 1..=iterations {
            info!(iteration, iterations, model, "test iteration");
            let outputs = crew.kickoff(pipeline, inputs).await?;

            for output in outputs.iter() {
                let mut variables = inputs.clone();
                if let Some(vars) = variables.as_object_mut() {
                    vars.insert("task_id".to_string(), output.task_id.clone().into());
                    vars.insert("output".to_string(), output.raw.clone().into());
                }

                let answer = self
                    .runner
                    .run_step(
                        pipeline.len(),
                        &self.evaluation_step,
                        &variables,
                        &CrewOutput::new(),
                        None,
                    )
                    .await?;

                let score = parse_score(&answer.raw).ok_or_else(|| CrewError::UnparseableScore {
                    task_id: output.task_id.clone(),
                    answer: answer.raw.clone(),
                })?;
                report.record(&output.task_id, score);
            }
        }

        Ok(report)
    }
}

/// First integer in `answer`, clamped to 1..=10.
pub fn parse_score(answer: &str) -> Option<u8> {
    let digits: String = answer
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }

    // Overlong numbers clamp to the top of the scale.
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    u8::try_from(value.clamp(1, 10)).ok()
}
