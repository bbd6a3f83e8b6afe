use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Pipeline;
use tracing::{info, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod pipeline;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let level = config.args.log_level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    Pipeline::new(config)?.run().await?;

    info!("Pipeline completed successfully!");
    Ok(())
}
