//! `replay`: resume the latest journaled run from a task.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput, StepProgress, TableFormatter};
use crate::domain::models::{Config, CrewOutput, RunRecord};
use crate::services::{ObserverSet, PersistingObserver, StepObserver};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Task to restart from; earlier outputs are reused
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub replayed_run: String,
    pub from_task: String,
    pub run_id: String,
    pub outputs: CrewOutput,
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        format!(
            "Replayed run {} from '{}'\n{}",
            self.replayed_run,
            self.from_task,
            TableFormatter::new().format_outputs(&self.outputs)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ReplayArgs, config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let progress = if json { StepProgress::hidden() } else { StepProgress::new() };

    let result = replay(&ctx, &args, &progress).await;
    if result.is_err() {
        progress.fail("replay failed");
    }
    output(&result?, json);
    Ok(())
}

/// Replay the latest run and journal the result as the new latest run.
pub async fn replay(
    ctx: &AppContext,
    args: &ReplayArgs,
    progress: &dyn StepObserver,
) -> Result<ReplayOutput> {
    let persisting = PersistingObserver::new(ctx.writer.clone());
    let observers = ObserverSet(vec![&persisting as &dyn StepObserver, progress]);
    let journal = ctx.journal();

    let started_at = Utc::now();
    let (previous, outputs) = ctx
        .runner
        .replay_latest(&journal, &args.task_id, &observers)
        .await
        .with_context(|| format!("Failed to replay from task '{}'", args.task_id))?;

    let record = RunRecord::new(previous.pipeline.clone(), previous.inputs.clone(), started_at, &outputs);
    journal
        .record(&record)
        .context("Failed to record the replayed run")?;

    Ok(ReplayOutput {
        replayed_run: previous.run_id.to_string(),
        from_task: args.task_id.clone(),
        run_id: record.run_id.to_string(),
        outputs,
    })
}
