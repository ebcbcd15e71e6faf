//! `kickoff`: one non-interactive crew run over `workflow.crew_tasks`.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput, StepProgress, TableFormatter};
use crate::domain::models::{Config, CrewOutput, RunRecord};
use crate::services::{ObserverSet, PersistingObserver, StepObserver};

#[derive(Args, Debug, Clone, Default)]
pub struct KickoffArgs {
    /// Course concept file (overrides concept_path)
    #[arg(long)]
    pub concept: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct KickoffOutput {
    pub run_id: String,
    pub journal: String,
    pub outputs: CrewOutput,
}

impl CommandOutput for KickoffOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\nRun {} recorded in {}",
            TableFormatter::new().format_outputs(&self.outputs),
            self.run_id,
            self.journal
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: KickoffArgs, config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let progress = if json { StepProgress::hidden() } else { StepProgress::new() };

    let result = kickoff(&ctx, &args, &progress).await;
    if result.is_err() {
        progress.fail("crew failed");
    }
    output(&result?, json);
    Ok(())
}

/// Run the crew, persist every output and journal the run.
pub async fn kickoff(
    ctx: &AppContext,
    args: &KickoffArgs,
    progress: &dyn StepObserver,
) -> Result<KickoffOutput> {
    let concept = ctx.concept(args.concept.as_deref())?;
    let pipeline = ctx.crew_pipeline()?;
    let inputs = concept.variables();

    let persisting = PersistingObserver::new(ctx.writer.clone());
    let observers = ObserverSet(vec![&persisting as &dyn StepObserver, progress]);

    let started_at = Utc::now();
    let outputs = ctx
        .runner
        .kickoff_with(&pipeline, &inputs, &observers)
        .await
        .context("Crew run failed")?;

    let record = RunRecord::new(pipeline, inputs, started_at, &outputs);
    let journal = ctx
        .journal()
        .record(&record)
        .context("Failed to record the run")?;

    Ok(KickoffOutput {
        run_id: record.run_id.to_string(),
        journal: journal.display().to_string(),
        outputs,
    })
}
