//! Human approval loop
//!
//! Shows the current outline to the operator until they type the approval
//! sentinel. Any other non-empty answer is treated as revision feedback and
//! triggers exactly one revision task.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::models::{ApprovalState, CrewOutput, OperatorDecision, TaskStep};
use crate::domain::ports::{Operator, OperatorError};
use crate::infrastructure::output::ArtifactWriter;
use crate::services::crew_runner::{CrewError, CrewRunner};

/// Artifact holding the approved outline
pub const FINAL_OUTLINE_FILE: &str = "final_outline.md";

const APPROVAL_QUESTION: &str =
    "Type 'approved' to accept this outline, or describe the changes you want:";

/// Errors raised by the approval loop
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Operator input closed before the outline was approved")]
    OperatorUnavailable,

    #[error(transparent)]
    Operator(OperatorError),

    #[error("Outline revision failed: {0}")]
    Revision(#[from] CrewError),
}

impl From<OperatorError> for ApprovalError {
    fn from(err: OperatorError) -> Self {
        match err {
            OperatorError::InputClosed => Self::OperatorUnavailable,
            other => Self::Operator(other),
        }
    }
}

/// Result of a completed approval loop
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The outline the operator approved
    pub outline: String,
    /// Number of revisions made with operator feedback
    pub human_revisions: u32,
    /// Path of `final_outline.md`, if it could be written
    pub final_path: Option<std::path::PathBuf>,
}

/// Drives outline revisions until the operator approves
pub struct ApprovalLoop {
    runner: CrewRunner,
    operator: Arc<dyn Operator>,
    writer: ArtifactWriter,
    revision_step: TaskStep,
    persist_history: bool,
    state: ApprovalState,
}

impl ApprovalLoop {
    /// `revision_step` is run once per feedback; it receives the current
    /// outline as `{outline}` and the feedback as `{feedback}`.
    pub fn new(
        runner: CrewRunner,
        operator: Arc<dyn Operator>,
        writer: ArtifactWriter,
        revision_step: TaskStep,
    ) -> Self {
        Self {
            runner,
            operator,
            writer,
            revision_step,
            persist_history: true,
            state: ApprovalState::AiRevised,
        }
    }

    pub fn with_history(mut self, persist_history: bool) -> Self {
        self.persist_history = persist_history;
        self
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    fn transition(&mut self, next: ApprovalState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal approval transition {} -> {next}",
            self.state
        );
        debug!(from = %self.state, to = %next, "approval state");
        self.state = next;
    }

    fn snapshot(&self, relative: &str, content: &str) {
        if self.persist_history {
            self.writer.persist(relative, content);
        }
    }

    /// Run the loop starting from the AI-revised outline.
    #[instrument(skip_all)]
    pub async fn run(
        &mut self,
        outline: String,
        inputs: &serde_json::Value,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let mut current = outline;
        let mut iteration: u32 = 0;

        self.transition(ApprovalState::AwaitingHuman);
        self.snapshot(&format!("outline_revision_{iteration}.md"), &current);

        loop {
            self.operator
                .present(&format!("Course outline (revision {iteration})"), &current)
                .await?;

            let answer = self.operator.ask(APPROVAL_QUESTION).await?;
            match OperatorDecision::parse(&answer) {
                OperatorDecision::Empty => {
                    debug!("empty operator input, asking again");
                }
                OperatorDecision::Approve => {
                    self.transition(ApprovalState::Approved);
                    break;
                }
                OperatorDecision::Revise(feedback) => {
                    self.transition(ApprovalState::HumanRevising);
                    iteration += 1;
                    info!(iteration, "revising outline with operator feedback");
                    self.snapshot(&format!("human_feedback_{iteration}.md"), &feedback);

                    current = self.revise(&current, &feedback, inputs, iteration).await?;

                    self.snapshot(&format!("outline_revision_{iteration}.md"), &current);
                    self.transition(ApprovalState::AwaitingHuman);
                }
            }
        }

        let final_path = self.writer.persist(FINAL_OUTLINE_FILE, &current);
        info!(human_revisions = iteration, "outline approved");

        Ok(ApprovalOutcome {
            outline: current,
            human_revisions: iteration,
            final_path,
        })
    }

    async fn revise(
        &self,
        outline: &str,
        feedback: &str,
        inputs: &serde_json::Value,
        iteration: u32,
    ) -> Result<String, CrewError> {
        let mut variables = inputs.clone();
        if let Some(vars) = variables.as_object_mut() {
            vars.insert("outline".to_string(), outline.into());
            vars.insert("feedback".to_string(), feedback.into());
        }

        let output = self
            .runner
            .run_step(
                iteration as usize,
                &self.revision_step,
                &variables,
                &CrewOutput::new(),
                None,
            )
            .await?;
        Ok(output.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AgentPersona;
    use crate::infrastructure::console::ScriptedOperator;
    use crate::infrastructure::substrates::{MockSubstrate, SubstrateRegistry};
    use crate::services::agent_registry::AgentRegistry;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(
        mock: &MockSubstrate,
        operator: &ScriptedOperator,
        dir: &TempDir,
    ) -> ApprovalLoop {
        let agents = AgentRegistry::new()
            .with_persona(AgentPersona::new("dev", "Dev", "Write", "You write."))
            .unwrap();
        let runner = CrewRunner::new(
            Arc::new(SubstrateRegistry::with_substrate(Arc::new(mock.clone()))),
            Arc::new(agents),
        );
        let step = TaskStep::new(
            "human_revision",
            "Revise:\n{outline}\nFeedback: {feedback}",
            "outline",
            "dev",
        );
        ApprovalLoop::new(
            runner,
            Arc::new(operator.clone()),
            ArtifactWriter::new(dir.path()),
            step,
        )
    }

    #[tokio::test]
    async fn test_blank_input_reprompts_without_revision() {
        let dir = TempDir::new().unwrap();
        let mock = MockSubstrate::new();
        let operator = ScriptedOperator::new(["", "   ", "APPROVED"]);
        let mut approval = setup(&mock, &operator, &dir);

        let outcome = approval.run("outline v0".into(), &json!({})).await.unwrap();
        assert_eq!(outcome.outline, "outline v0");
        assert_eq!(outcome.human_revisions, 0);
        assert_eq!(operator.questions().len(), 3);
        assert!(mock.requests().await.is_empty());
        assert_eq!(approval.state(), ApprovalState::Approved);
    }

    #[tokio::test]
    async fn test_feedback_reaches_revision_prompt() {
        let dir = TempDir::new().unwrap();
        let mock = MockSubstrate::scripted([("human_revision", "outline v1")]);
        let operator = ScriptedOperator::new(["shorter intro", "approved"]);
        let mut approval = setup(&mock, &operator, &dir);

        let outcome = approval.run("outline v0".into(), &json!({})).await.unwrap();
        assert_eq!(outcome.outline, "outline v1");
        assert_eq!(outcome.human_revisions, 1);

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("outline v0"));
        assert!(requests[0].prompt.contains("Feedback: shorter intro"));

        assert_eq!(
            std::fs::read_to_string(dir.path().join("outline_revision_1.md")).unwrap(),
            "outline v1"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(FINAL_OUTLINE_FILE)).unwrap(),
            "outline v1"
        );
    }

    #[tokio::test]
    async fn test_braces_in_outline_and_feedback_reach_prompt_verbatim() {
        let dir = TempDir::new().unwrap();
        let mock = MockSubstrate::scripted([("human_revision", "outline v1")]);
        let operator = ScriptedOperator::new(["repeat {outline} verbatim in section 2", "approved"]);
        let mut approval = setup(&mock, &operator, &dir);

        let outline = "1. Prompt templates like `Summarise {topic}`".to_string();
        approval
            .run(outline, &json!({"topic": "Generative AI"}))
            .await
            .unwrap();

        let prompt = &mock.requests().await[0].prompt;
        assert!(prompt.starts_with(
            "Revise:\n1. Prompt templates like `Summarise {topic}`\nFeedback: repeat {outline} verbatim in section 2"
        ));
        assert!(!prompt.contains("Generative AI"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("human_feedback_1.md")).unwrap(),
            "repeat {outline} verbatim in section 2"
        );
    }

    #[tokio::test]
    async fn test_closed_input_is_operator_unavailable() {
        let dir = TempDir::new().unwrap();
        let mock = MockSubstrate::new();
        let operator = ScriptedOperator::new(Vec::<String>::new());
        let mut approval = setup(&mock, &operator, &dir);

        let err = approval.run("outline".into(), &json!({})).await.unwrap_err();
        assert!(matches!(err, ApprovalError::OperatorUnavailable));
        assert!(!dir.path().join(FINAL_OUTLINE_FILE).exists());
    }

    #[tokio::test]
    async fn test_history_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mock = MockSubstrate::new();
        let operator = ScriptedOperator::new(["more examples", "approved"]);
        let mut approval = setup(&mock, &operator, &dir).with_history(false);

        approval.run("outline".into(), &json!({})).await.unwrap();
        assert!(!dir.path().join("outline_revision_0.md").exists());
        assert!(!dir.path().join("human_feedback_1.md").exists());
        assert!(dir.path().join(FINAL_OUTLINE_FILE).exists());
    }
}
