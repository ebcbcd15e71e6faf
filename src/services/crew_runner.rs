//! Crew Runner
//!
//! Executes a pipeline strictly sequentially against the configured LLM
//! substrate. Step N+1 is not started until step N's output is stored, and
//! its prompt embeds the outputs of its context steps.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DomainError;
use crate::domain::models::{CrewOutput, Pipeline, RunRecord, TaskOutput, TaskStep};
use crate::domain::models::task_step::interpolate;
use crate::domain::ports::{OperatorError, SubstrateError, SubstrateRequest};
use crate::infrastructure::output::{ArtifactWriter, OutputError, RunJournal};
use crate::infrastructure::substrates::SubstrateRegistry;
use crate::services::agent_registry::AgentRegistry;

/// Errors raised while running a crew
#[derive(Debug, Error)]
pub enum CrewError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Task '{task_id}' (step {}) failed: {source}", .index + 1)]
    TaskFailed {
        task_id: String,
        index: usize,
        #[source]
        source: SubstrateError,
    },

    #[error("No run journal found; run `kickoff` before `replay`")]
    JournalNotFound,

    #[error("Training file must be a .json file: {0}")]
    InvalidTrainingFile(String),

    #[error("Number of iterations must be at least 1")]
    InvalidIterations,

    #[error("Evaluator answer for task '{task_id}' contains no score: {answer}")]
    UnparseableScore { task_id: String, answer: String },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Operator(#[from] OperatorError),
}

/// Callback invoked around each executed step.
pub trait StepObserver: Send + Sync {
    fn on_step_started(&self, _index: usize, _total: usize, _step: &TaskStep) {}

    fn on_step_completed(&self, _index: usize, _total: usize, _output: &TaskOutput) {}
}

/// Observer that does nothing.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}

/// Writes every completed output to its artifact path as it completes.
pub struct PersistingObserver {
    writer: ArtifactWriter,
}

impl PersistingObserver {
    pub fn new(writer: ArtifactWriter) -> Self {
        Self { writer }
    }
}

impl StepObserver for PersistingObserver {
    fn on_step_completed(&self, _index: usize, _total: usize, output: &TaskOutput) {
        self.writer.persist(&output.output_file, &output.raw);
    }
}

/// Fans events out to several observers in order.
pub struct ObserverSet<'a>(pub Vec<&'a dyn StepObserver>);

impl StepObserver for ObserverSet<'_> {
    fn on_step_started(&self, index: usize, total: usize, step: &TaskStep) {
        for observer in &self.0 {
            observer.on_step_started(index, total, step);
        }
    }

    fn on_step_completed(&self, index: usize, total: usize, output: &TaskOutput) {
        for observer in &self.0 {
            observer.on_step_completed(index, total, output);
        }
    }
}

/// Sequential pipeline executor
#[derive(Clone)]
pub struct CrewRunner {
    substrates: Arc<SubstrateRegistry>,
    agents: Arc<AgentRegistry>,
    model_override: Option<String>,
}

impl CrewRunner {
    pub fn new(substrates: Arc<SubstrateRegistry>, agents: Arc<AgentRegistry>) -> Self {
        Self {
            substrates,
            agents,
            model_override: None,
        }
    }

    /// Pin every request of this runner to `model`.
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// Run every step of `pipeline` and return all outputs.
    pub async fn kickoff(
        &self,
        pipeline: &Pipeline,
        inputs: &serde_json::Value,
    ) -> Result<CrewOutput, CrewError> {
        self.kickoff_with(pipeline, inputs, &NoopObserver).await
    }

    pub async fn kickoff_with(
        &self,
        pipeline: &Pipeline,
        inputs: &serde_json::Value,
        observer: &dyn StepObserver,
    ) -> Result<CrewOutput, CrewError> {
        self.run_from(pipeline, inputs, CrewOutput::new(), observer)
            .await
    }

    /// Run `pipeline` with `seed` holding already known outputs. Steps with
    /// a seeded output are not executed again.
    #[instrument(skip_all, fields(pipeline = %pipeline.name, seeded = seed.len()))]
    pub async fn run_from(
        &self,
        pipeline: &Pipeline,
        inputs: &serde_json::Value,
        seed: CrewOutput,
        observer: &dyn StepObserver,
    ) -> Result<CrewOutput, CrewError> {
        pipeline.validate()?;
        self.agents.check_pipeline(pipeline)?;

        let total = pipeline.len();
        info!(steps = total, substrate = self.substrates.substrate_id(), "starting crew");

        let mut outputs = seed;
        for (index, step) in pipeline.steps.iter().enumerate() {
            if outputs.contains(&step.id) {
                debug!(task_id = %step.id, "output seeded, skipping");
                continue;
            }
            observer.on_step_started(index, total, step);
            let output = self.run_step(index, step, inputs, &outputs, None).await?;
            observer.on_step_completed(index, total, &output);
            outputs.push(output);
        }

        info!(completed = outputs.len(), "crew finished");
        Ok(outputs)
    }

    /// Execute a single step.
    ///
    /// `completed` must hold every context output of `step`. `addendum` is
    /// appended to the prompt verbatim.
    #[instrument(skip(self, step, inputs, completed, addendum), fields(task_id = %step.id, agent = %step.agent))]
    pub async fn run_step(
        &self,
        index: usize,
        step: &TaskStep,
        inputs: &serde_json::Value,
        completed: &CrewOutput,
        addendum: Option<&str>,
    ) -> Result<TaskOutput, CrewError> {
        let persona = self.agents.get(&step.agent)?;

        let context = step
            .context
            .iter()
            .map(|id| completed.result_for(id))
            .collect::<Result<Vec<&str>, DomainError>>()?;

        let mut prompt = step.build_prompt(inputs, &context);
        if let Some(addendum) = addendum {
            prompt.push_str(addendum);
        }

        let mut request = SubstrateRequest::new(
            step.id.clone(),
            persona.id.clone(),
            interpolate(&persona.system_prompt(), inputs),
            prompt,
        );
        if let Some(model) = self.model_override.as_ref().or(persona.llm.as_ref()) {
            request = request.with_model(model.clone());
        }

        debug!(prompt_len = request.prompt.len(), "executing task");

        let response = self
            .substrates
            .execute(request)
            .await
            .map_err(|source| CrewError::TaskFailed {
                task_id: step.id.clone(),
                index,
                source,
            })?;

        if let Some(usage) = response.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "token usage"
            );
        }
        let truncated = response.is_truncated();
        if truncated {
            warn!(
                task_id = %step.id,
                "answer stopped at the token limit; the artifact is incomplete"
            );
        }

        info!(
            task_id = %step.id,
            chars = response.content.len(),
            "task completed"
        );

        Ok(TaskOutput::new(
            step.id.clone(),
            persona.id.clone(),
            response.content,
            step.artifact_path(),
        )
        .with_truncated(truncated))
    }

    /// Re-run `record` from `task_id` onwards, reusing the recorded outputs
    /// of every earlier task.
    pub async fn replay(
        &self,
        record: &RunRecord,
        task_id: &str,
        observer: &dyn StepObserver,
    ) -> Result<CrewOutput, CrewError> {
        let pipeline = &record.pipeline;
        let start = pipeline
            .position(task_id)
            .ok_or_else(|| DomainError::TaskOutputNotFound(task_id.to_string()))?;

        let recorded = record.crew_output();
        let mut seed = CrewOutput::new();
        for step in &pipeline.steps[..start] {
            seed.push(recorded.get(&step.id)?.clone());
        }

        info!(task_id, reused = seed.len(), "replaying run {}", record.run_id);
        self.run_from(pipeline, &record.inputs, seed, observer)
            .await
    }

    /// Replay the latest journaled run.
    pub async fn replay_latest(
        &self,
        journal: &RunJournal,
        task_id: &str,
        observer: &dyn StepObserver,
    ) -> Result<(RunRecord, CrewOutput), CrewError> {
        let record = journal.latest()?.ok_or(CrewError::JournalNotFound)?;
        let output = self.replay(&record, task_id, observer).await?;
        Ok((record, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AgentPersona;
    use crate::infrastructure::substrates::MockSubstrate;
    use chrono::Utc;
    use serde_json::json;

    fn agents() -> Arc<AgentRegistry> {
        let registry = AgentRegistry::new()
            .with_persona(AgentPersona::new(
                "writer",
                "Writer about {topic}",
                "Write",
                "You write.",
            ))
            .unwrap()
            .with_persona(
                AgentPersona::new("reviewer", "Reviewer", "Review", "You review.")
                    .with_llm("pinned-model"),
            )
            .unwrap();
        Arc::new(registry)
    }

    fn pipeline() -> Pipeline {
        Pipeline::new("test")
            .with_step(TaskStep::new("draft", "Draft {topic}", "text", "writer"))
            .with_step(
                TaskStep::new("review", "Review it", "text", "reviewer")
                    .with_context(vec!["draft".to_string()]),
            )
            .with_step(
                TaskStep::new("final", "Finalise", "text", "writer")
                    .with_context(vec!["draft".to_string(), "review".to_string()]),
            )
    }

    fn runner(mock: &MockSubstrate) -> CrewRunner {
        let registry = SubstrateRegistry::with_substrate(Arc::new(mock.clone()));
        CrewRunner::new(Arc::new(registry), agents())
    }

    #[tokio::test]
    async fn test_kickoff_sequential_with_context() {
        let mock = MockSubstrate::scripted([
            ("draft", "DRAFT"),
            ("review", "REVIEW"),
            ("final", "FINAL"),
        ]);
        let output = runner(&mock)
            .kickoff(&pipeline(), &json!({"topic": "Rust"}))
            .await
            .unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output.final_output(), Some("FINAL"));
        assert_eq!(mock.executed_tasks().await, vec!["draft", "review", "final"]);

        let requests = mock.requests().await;
        assert!(requests[0].prompt.starts_with("Draft Rust"));
        assert!(requests[0].system_prompt.starts_with("You are Writer about Rust."));
        assert!(requests[2].prompt.ends_with("DRAFT\n\n----------\n\nREVIEW"));
        assert_eq!(requests[0].parameters.model, None);
        assert_eq!(requests[1].parameters.model.as_deref(), Some("pinned-model"));
    }

    #[tokio::test]
    async fn test_failure_aborts_with_index() {
        let mock = MockSubstrate::new();
        mock.fail_on("review").await;

        let err = runner(&mock)
            .kickoff(&pipeline(), &json!({}))
            .await
            .unwrap_err();
        match err {
            CrewError::TaskFailed { task_id, index, .. } => {
                assert_eq!(task_id, "review");
                assert_eq!(index, 1);
            }
            other => panic!("Expected TaskFailed, got {other:?}"),
        }
        assert_eq!(mock.executed_tasks().await, vec!["draft", "review"]);
    }

    #[tokio::test]
    async fn test_unknown_agent_rejected_before_execution() {
        let mock = MockSubstrate::new();
        let bad = Pipeline::new("bad").with_step(TaskStep::new("x", "d", "e", "ghost"));
        let err = runner(&mock).kickoff(&bad, &json!({})).await.unwrap_err();
        assert!(matches!(err, CrewError::Domain(DomainError::AgentNotFound(_))));
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_model_override_wins() {
        let mock = MockSubstrate::new();
        runner(&mock)
            .with_model_override("test-model")
            .kickoff(&pipeline(), &json!({}))
            .await
            .unwrap();
        for request in mock.requests().await {
            assert_eq!(request.parameters.model.as_deref(), Some("test-model"));
        }
    }

    #[tokio::test]
    async fn test_token_limit_marks_output_truncated() {
        let mock = MockSubstrate::scripted([("review", "Half a rev")]);
        mock.truncate_on("review").await;

        let output = runner(&mock)
            .kickoff(&pipeline(), &json!({}))
            .await
            .unwrap();

        let review = output.get("review").unwrap();
        assert!(review.truncated);
        assert_eq!(review.raw, "Half a rev");
        assert!(!output.get("draft").unwrap().truncated);
        assert_eq!(output.len(), 3);
    }

    #[tokio::test]
    async fn test_replay_reuses_earlier_outputs() {
        let first = MockSubstrate::scripted([("draft", "D1"), ("review", "R1"), ("final", "F1")]);
        let output = runner(&first)
            .kickoff(&pipeline(), &json!({"topic": "Rust"}))
            .await
            .unwrap();
        let record = RunRecord::new(pipeline(), json!({"topic": "Rust"}), Utc::now(), &output);

        let second = MockSubstrate::scripted([("review", "R2"), ("final", "F2")]);
        let replayed = runner(&second)
            .replay(&record, "review", &NoopObserver)
            .await
            .unwrap();

        assert_eq!(second.executed_tasks().await, vec!["review", "final"]);
        assert_eq!(replayed.result_for("draft").unwrap(), "D1");
        assert_eq!(replayed.result_for("review").unwrap(), "R2");
        assert_eq!(replayed.final_output(), Some("F2"));
    }

    #[tokio::test]
    async fn test_replay_unknown_task() {
        let mock = MockSubstrate::new();
        let record = RunRecord::new(pipeline(), json!({}), Utc::now(), &CrewOutput::new());
        let err = runner(&mock)
            .replay(&record, "quiz", &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrewError::Domain(DomainError::TaskOutputNotFound(_))
        ));
    }
}
