//! CLI module for covidash
//!
//! Command-line interface definitions and handlers for the Covid-19 dashboard.
//!
//! # Commands
//!
//! - `serve` - Start the dashboard server
//! - `fetch` - Download the contagion and vaccination datasets
//! - `areas` - List the selectable areas
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the dashboard on port 8501
//! covidash serve
//!
//! # Download only the vaccination files, replacing existing ones
//! covidash fetch --only vaccinations --force
//!
//! # Generate shell completions
//! covidash completions bash > ~/.bash_completion.d/covidash
//! ```

pub mod areas;
pub mod completions;
pub mod config;
pub mod fetch;
pub mod output;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::CovidashConfig;
use crate::fetch::Dataset;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Default configuration file, optional.
pub const DEFAULT_CONFIG_FILE: &str = "covidash.toml";

/// covidash - Covid-19 dashboard for Italy
#[derive(Parser, Debug)]
#[command(
    name = "covidash",
    version,
    about = "Covid-19 contagion and vaccination dashboard for Italy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(ServeArgs),
    /// Download the datasets into the data directory
    Fetch(FetchArgs),
    /// List the selectable areas
    Areas(AreasArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Serve the local files without downloading updates
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Download files even when they already exist
    #[arg(short, long)]
    pub force: bool,

    /// Update a single dataset
    #[arg(long, value_enum)]
    pub only: Option<Dataset>,

    /// First day of contagion reports (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of contagion reports (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AreasArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the configuration file when present, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<CovidashConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        CovidashConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        CovidashConfig::default()
    };

    Ok(config.with_env_overrides())
}
