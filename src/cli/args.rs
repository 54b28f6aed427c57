//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stagepath - Staging-path allocator
///
/// Allocates temp paths inside staging directories colocated with
/// their destination, safe to promote with a same-filesystem rename.
#[derive(Parser, Debug)]
#[command(name = "stagepath")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STAGEPATH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .stagepath.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Allocate external temp paths for destinations
    Allocate(AllocateArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the allocate command
#[derive(Parser, Debug)]
pub struct AllocateArgs {
    /// Destination paths (e.g. hdfs://nn1/warehouse/db/tbl)
    #[arg(required = true)]
    pub destinations: Vec<String>,

    /// Execution unit id to allocate under (defaults to the current thread)
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Keep staging directories instead of removing them on exit
    #[arg(short, long)]
    pub keep: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., staging.dir)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for allocate command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
