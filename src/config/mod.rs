use crate::config::cli::Args;
use crate::error::Result;
use clap::Parser;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;
pub use cli::Command;

/// One upcoming game to predict for, declared in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingGame {
    pub team: String,
    /// Opponent as it appears in game logs, e.g. "vsDEN" or "@BOS".
    pub opponent: String,
    /// Compact date token, e.g. "Mon 3/9".
    pub date: String,
}

/// Declarative entity list driving the whole pipeline. Replaces the
/// one-script-per-team sprawl this repo descends from.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub teams: Vec<String>,
    /// Trend page kinds fetched per team (ats-trends, over-under-trends, win-trends).
    #[serde(default = "default_trend_kinds")]
    pub trend_kinds: Vec<String>,
    #[serde(default)]
    pub upcoming_games: Vec<UpcomingGame>,
    /// First calendar year of the season, e.g. 2024 for 2024-25.
    pub season_start_year: i32,
    #[serde(default = "default_trade_feed_url")]
    pub trade_feed_url: String,
}

fn default_trend_kinds() -> Vec<String> {
    vec![
        "ats-trends".to_string(),
        "over-under-trends".to_string(),
        "win-trends".to_string(),
    ]
}

fn default_trade_feed_url() -> String {
    "https://www.nba.com/news/2024-25-nba-trade-tracker".to_string()
}

pub struct Config {
    pub args: Args,
    pub pipeline: PipelineConfig,
    pub http_client: Client,
}

impl Config {
    pub fn new() -> Result<Self> {
        let args = Args::parse();
        Self::from_args(args)
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let pipeline: PipelineConfig =
            serde_json::from_str(&std::fs::read_to_string(&args.config_file)?)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(args.fetch_timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            args,
            pipeline,
            http_client,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }
        if !self.args.cache_dir.exists() {
            std::fs::create_dir_all(&self.args.cache_dir)?;
        }

        info!("Data and cache dirs exist");
        Ok(())
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.args.freshness_hours * 60 * 60)
    }
}
