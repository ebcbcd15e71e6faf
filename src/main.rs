//! Masterclass CLI entry point.

use anyhow::Result;
use clap::Parser;

use masterclass::cli::{commands, handle_error, Cli, Commands};
use masterclass::infrastructure::config::ConfigLoader;
use masterclass::infrastructure::logging::LoggerImpl;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let json = cli.json;

    tokio::select! {
        result = run(cli) => {
            if let Err(err) = result {
                handle_error(err, json);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Process interrupted by user.");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load_optional(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Kickoff(args) => commands::kickoff::execute(args, &config, cli.json).await,
        Commands::Train(args) => commands::train::execute(args, &config, cli.json).await,
        Commands::Replay(args) => commands::replay::execute(args, &config, cli.json).await,
        Commands::Test(args) => commands::test::execute(args, &config, cli.json).await,
    }
}
