//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbseed - provision databases from cached templates
///
/// Creates databases with a preinstalled component set, backed by a cache
/// of database templates keyed by a content fingerprint of the components.
#[derive(Parser, Debug)]
#[command(name = "dbseed")]
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
    #[arg(short, long, global = true, env = "DBSEED_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a database, from the template cache when possible
    New(NewArgs),

    /// Inspect and evict cached templates
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the new command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Name of the database to create, possibly from cache.
    /// If absent, only cache trimming runs.
    #[arg(short = 'n', long)]
    pub database: Option<String>,

    /// Comma separated list of components to install
    #[arg(short = 'm', long, value_delimiter = ',', default_value = "core")]
    pub components: Vec<String>,

    /// Skip loading demo data
    #[arg(long)]
    pub no_demo: bool,

    /// Bypass the template cache entirely (also skips trimming)
    #[arg(long)]
    pub no_cache: bool,

    /// Cache prefix override (max 8 characters)
    #[arg(long)]
    pub cache_prefix: Option<String>,

    /// Drop templates unused for more than N days (-1 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub cache_max_age: Option<i64>,

    /// Keep the N most recently used templates (-1 disables, 0 empties)
    #[arg(long, allow_negative_numbers = true)]
    pub cache_max_size: Option<i64>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached templates, most recently used first
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Cache prefix (default: from config)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Show the number of cached templates
    Size {
        /// Cache prefix (default: from config)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Drop every cached template under the prefix
    Purge {
        /// Cache prefix (default: from config)
        #[arg(long)]
        prefix: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Apply count and age thresholds now
    Trim {
        /// Cache prefix (default: from config)
        #[arg(long)]
        prefix: Option<String>,

        /// Keep the N most recently used templates (default: from config)
        #[arg(long)]
        max_size: Option<i64>,

        /// Drop templates unused for more than N days (default: from config)
        #[arg(long)]
        max_age: Option<i64>,
    },
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
        /// Configuration key (e.g., cache.prefix)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
