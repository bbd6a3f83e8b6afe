use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Path to pipeline configuration file
    #[arg(long, default_value = "pipeline_config.json")]
    pub config_file: PathBuf,

    /// Directory for persisted datasets
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for caching intermediate results
    #[arg(long, default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Maximum concurrent fetches against a single host
    #[arg(long, default_value_t = 4)]
    pub max_in_flight: usize,

    /// Per-entity fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Freshness window for cached lookups, in hours
    #[arg(long, env = "HOOPLINE_FRESHNESS_HOURS", default_value_t = 24)]
    pub freshness_hours: u64,

    /// Skip using cached data
    #[arg(long)]
    pub skip_cache: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch and persist team/player datasets only
    Scrape,
    /// Assemble features from persisted datasets and predict only
    Predict,
}
