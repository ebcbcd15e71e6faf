//! Masterclass workflow
//!
//! Outline phase, optional human approval, then the materials phase. Every
//! task output is written to its artifact file as soon as it completes.
//! Material tasks read the approved outline through their `final_outline`
//! context.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::errors::DomainError;
use crate::domain::models::{CourseConcept, CrewOutput, Pipeline, WorkflowConfig};
use crate::domain::ports::Operator;
use crate::infrastructure::output::ArtifactWriter;
use crate::services::approval_loop::{ApprovalError, ApprovalLoop, FINAL_OUTLINE_FILE};
use crate::services::crew_runner::{
    CrewError, CrewRunner, ObserverSet, PersistingObserver, StepObserver,
};
use crate::services::task_builder::TaskBuilder;

/// Last step of the outline phase; its dependencies come along.
pub const OUTLINE_TASK: &str = "final_outline";

/// Step run for each round of operator feedback.
pub const REVISION_TASK: &str = "human_revision";

/// Errors raised by the workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Crew(#[from] CrewError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("Outline approval is enabled but no operator is attached")]
    NoOperator,
}

/// Everything produced by one workflow run
#[derive(Debug, Clone)]
pub struct MasterclassOutcome {
    /// Outline task plus every material task, dependencies first
    pub pipeline: Pipeline,
    pub outline_phase: CrewOutput,
    pub approved_outline: String,
    pub human_revisions: u32,
    pub materials: CrewOutput,
    /// Artifact paths of the materials, in execution order
    pub artifacts: Vec<PathBuf>,
}

impl MasterclassOutcome {
    /// Outputs of both phases, with the approved text as the outline output.
    pub fn combined(&self) -> Result<CrewOutput, DomainError> {
        let mut combined = with_approved(&self.outline_phase, &self.approved_outline)?;
        for output in self.materials.iter() {
            combined.push(output.clone());
        }
        Ok(combined)
    }
}

fn with_approved(outline_phase: &CrewOutput, approved_outline: &str) -> Result<CrewOutput, DomainError> {
    let mut outputs = outline_phase.clone();
    let mut approved = outline_phase.get(OUTLINE_TASK)?.clone();
    approved.raw = approved_outline.to_string();
    outputs.push(approved);
    Ok(outputs)
}

/// Composes the outline phase, the approval loop and the materials phase
pub struct MasterclassWorkflow {
    runner: CrewRunner,
    tasks: TaskBuilder,
    writer: ArtifactWriter,
    settings: WorkflowConfig,
    operator: Option<Arc<dyn Operator>>,
}

impl MasterclassWorkflow {
    pub fn new(
        runner: CrewRunner,
        tasks: TaskBuilder,
        writer: ArtifactWriter,
        settings: WorkflowConfig,
    ) -> Self {
        Self {
            runner,
            tasks,
            writer,
            settings,
            operator: None,
        }
    }

    pub fn with_operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Run the whole workflow for `concept`.
    ///
    /// `progress` sees every step of both phases, after persistence.
    #[instrument(skip_all, fields(topic = %concept.topic))]
    pub async fn run(
        &self,
        concept: &CourseConcept,
        progress: &dyn StepObserver,
    ) -> Result<MasterclassOutcome, WorkflowError> {
        let persisting = PersistingObserver::new(self.writer.clone());
        let observers = ObserverSet(vec![&persisting as &dyn StepObserver, progress]);
        let inputs = concept.variables();

        info!("outline phase");
        let outline_pipeline = self.tasks.pipeline("outline", &[OUTLINE_TASK])?;
        let outline_phase = self
            .runner
            .kickoff_with(&outline_pipeline, &inputs, &observers)
            .await?;
        let ai_outline = outline_phase.result_for(OUTLINE_TASK)?.to_string();

        let (approved_outline, human_revisions) = if self.settings.approval {
            let operator = self.operator.clone().ok_or(WorkflowError::NoOperator)?;
            let revision_step = self.tasks.step(REVISION_TASK)?;
            let mut approval =
                ApprovalLoop::new(self.runner.clone(), operator, self.writer.clone(), revision_step)
                    .with_history(self.settings.persist_history);
            let outcome = approval.run(ai_outline, &inputs).await?;
            (outcome.outline, outcome.human_revisions)
        } else {
            info!("approval disabled, accepting the AI-revised outline");
            self.writer.persist(FINAL_OUTLINE_FILE, &ai_outline);
            (ai_outline, 0)
        };

        info!("materials phase");
        let mut ids = vec![OUTLINE_TASK];
        ids.extend(self.settings.materials.iter().map(String::as_str));
        let pipeline = self.tasks.pipeline("masterclass", &ids)?;

        // Outline steps are seeded, with the approved text standing in for
        // the AI outline, so only material steps run.
        let seed = with_approved(&outline_phase, &approved_outline)?;

        let all_outputs = self
            .runner
            .run_from(&pipeline, &inputs, seed, &observers)
            .await?;
        let materials: CrewOutput = all_outputs
            .into_outputs()
            .into_iter()
            .filter(|o| !outline_phase.contains(&o.task_id))
            .collect::<Vec<_>>()
            .into();

        let artifacts = materials
            .iter()
            .filter_map(|o| self.writer.resolve(&o.output_file).ok())
            .collect();

        Ok(MasterclassOutcome {
            pipeline,
            outline_phase,
            approved_outline,
            human_revisions,
            materials,
            artifacts,
        })
    }
}
