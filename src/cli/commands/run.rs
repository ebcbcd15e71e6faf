//! `run`: the interactive masterclass workflow.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput, StepProgress};
use crate::domain::models::{Config, RunRecord};
use crate::domain::ports::Operator;
use crate::infrastructure::console::ConsoleOperator;
use crate::services::{MasterclassWorkflow, StepObserver, FINAL_OUTLINE_FILE};

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Accept the AI-revised outline without asking
    #[arg(long)]
    pub auto_approve: bool,

    /// Course concept file (overrides concept_path)
    #[arg(long)]
    pub concept: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub topic: String,
    pub human_revisions: u32,
    pub final_outline: String,
    pub artifacts: Vec<String>,
    pub run_id: String,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Masterclass \"{}\" ready.", self.topic)];
        if self.human_revisions > 0 {
            lines.push(format!("Outline revised {} time(s) with your feedback.", self.human_revisions));
        }
        lines.push(format!("Final outline: {}", self.final_outline));
        lines.push("Materials:".to_string());
        for artifact in &self.artifacts {
            lines.push(format!("  - {artifact}"));
        }
        lines.push(format!("Run {} recorded for replay.", self.run_id));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let progress = if json { StepProgress::hidden() } else { StepProgress::new() };

    let result = run_workflow(&ctx, &args, Arc::new(ConsoleOperator::new()), &progress).await;
    if result.is_err() {
        progress.fail("workflow failed");
    }
    output(&result?, json);
    Ok(())
}

/// Run the workflow with an explicit operator and progress observer.
pub async fn run_workflow(
    ctx: &AppContext,
    args: &RunArgs,
    operator: Arc<dyn Operator>,
    progress: &dyn StepObserver,
) -> Result<RunOutput> {
    let concept = ctx.concept(args.concept.as_deref())?;

    let mut settings = ctx.config.workflow.clone();
    if args.auto_approve {
        settings.approval = false;
    }

    let workflow = MasterclassWorkflow::new(
        ctx.runner.clone(),
        ctx.tasks.clone(),
        ctx.writer.clone(),
        settings,
    )
    .with_operator(operator);

    let started_at = Utc::now();
    let outcome = workflow
        .run(&concept, progress)
        .await
        .context("Masterclass workflow failed")?;

    let outputs = outcome.combined()?;
    let record = RunRecord::new(outcome.pipeline.clone(), concept.variables(), started_at, &outputs);
    ctx.journal()
        .record(&record)
        .context("Failed to record the run")?;

    Ok(RunOutput {
        topic: concept.topic,
        human_revisions: outcome.human_revisions,
        final_outline: ctx.writer.root().join(FINAL_OUTLINE_FILE).display().to_string(),
        artifacts: outcome
            .artifacts
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        run_id: record.run_id.to_string(),
    })
}
