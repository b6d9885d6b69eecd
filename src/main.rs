//! Dbseed - Database Provisioning with a Template Cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use dbseed::cli::{Cli, Commands};
use dbseed::config::ConfigManager;
use dbseed::error::DbseedResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DbseedResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("dbseed=warn"),
        1 => EnvFilter::new("dbseed=info"),
        _ => EnvFilter::new("dbseed=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Dispatch to command
    match cli.command {
        Commands::New(args) => dbseed::cli::commands::new(args, &config).await,
        Commands::Cache(args) => dbseed::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            dbseed::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
