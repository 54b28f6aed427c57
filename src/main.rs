//! stagepath - Staging-path allocator
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stagepath::cli::{Cli, Commands};
use stagepath::config::ConfigManager;
use stagepath::error::{StagingError, StagingResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status when a path could not be allocated, as opposed to a usage
/// or configuration problem (1)
const ALLOCATION_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            if e.is_allocation_failure() {
                ExitCode::from(ALLOCATION_FAILURE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> StagingResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| StagingError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let level = match (cli.verbose, config.general.verbose) {
        (0, false) => "stagepath=warn",
        (0, true) | (1, _) => "stagepath=info",
        _ => "stagepath=debug",
    };
    let filter = EnvFilter::new(level);

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(path) = &local_config_path {
        debug!("Using local config: {}", path.display());
    }

    // Dispatch to command
    match cli.command {
        Commands::Allocate(args) => stagepath::cli::commands::allocate(args, &config).await,
        Commands::Config(args) => {
            stagepath::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
