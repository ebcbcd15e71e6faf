//! `train`: repeated crew runs with operator feedback.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::Operator;
use crate::infrastructure::console::ConsoleOperator;
use crate::services::TrainingService;

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Number of training iterations
    pub n_iterations: u32,

    /// JSON file the training record is written to
    pub filename: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct TrainOutput {
    pub iterations: u32,
    pub entries: usize,
    pub feedback_items: usize,
    pub filename: String,
}

impl CommandOutput for TrainOutput {
    fn to_human(&self) -> String {
        format!(
            "Training finished: {} iteration(s), {} output(s), {} with feedback.\nRecord written to {}",
            self.iterations, self.entries, self.feedback_items, self.filename
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: TrainArgs, config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    let result = train(&ctx, &args, Arc::new(ConsoleOperator::new())).await?;
    output(&result, json);
    Ok(())
}

pub async fn train(
    ctx: &AppContext,
    args: &TrainArgs,
    operator: Arc<dyn Operator>,
) -> Result<TrainOutput> {
    let concept = ctx.concept_or_default()?;
    let pipeline = ctx.crew_pipeline()?;

    let record = TrainingService::new(ctx.runner.clone(), operator)
        .train(&pipeline, &concept.variables(), args.n_iterations, &args.filename)
        .await
        .context("An error occurred while training the crew")?;

    Ok(TrainOutput {
        iterations: record.iterations,
        entries: record.entries.len(),
        feedback_items: record.entries.iter().filter(|e| e.feedback.is_some()).count(),
        filename: args.filename.display().to_string(),
    })
}
