//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    kickoff::KickoffArgs, replay::ReplayArgs, run::RunArgs, test::TestArgs, train::TrainArgs,
};

#[derive(Parser, Debug)]
#[command(name = "masterclass")]
#[command(about = "Masterclass - agent crews that draft course material", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to masterclass.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Outline, human approval, then the course materials
    Run(RunArgs),

    /// Run the configured crew once without interaction
    Kickoff(KickoffArgs),

    /// Run the crew repeatedly and collect feedback on every output
    Train(TrainArgs),

    /// Re-run the latest crew run starting at a task
    Replay(ReplayArgs),

    /// Score crew outputs over several runs on one model
    Test(TestArgs),
}
