use crate::config::{Command, Config};
use crate::domain::storage::Storage;
use crate::error::Result;
use crate::infrastructure::{FileSystemStore, TradeFeedClient};
use crate::services::joining::JoinService;
use crate::services::prediction::{Prediction, PredictionService};
use crate::services::scraping::ScrapeService;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Wires config, storage and services together and runs the stages the
/// subcommand asks for. No subcommand runs scrape then predict.
pub struct Pipeline {
    config: Config,
    store: Arc<FileSystemStore>,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.ensure_directories()?;
        let store = Arc::new(FileSystemStore::new(
            config.args.data_dir.clone(),
            config.args.cache_dir.clone(),
        ));
        Ok(Self { config, store })
    }

    pub async fn run(&self) -> Result<()> {
        match self.config.args.command {
            Some(Command::Scrape) => self.scrape().await,
            Some(Command::Predict) => self.predict().await?,
            None => {
                self.scrape().await;
                self.predict().await?;
            }
        }
        Ok(())
    }

    async fn scrape(&self) {
        let store: Arc<dyn Storage> = self.store.clone();
        let service = ScrapeService::new(
            self.config.http_client.clone(),
            store,
            self.config.args.max_in_flight,
            std::time::Duration::from_secs(self.config.args.fetch_timeout_secs),
        );

        let report = service.run(&self.config.pipeline).await;
        info!("{report}");
    }

    async fn predict(&self) -> Result<()> {
        let store: Arc<dyn Storage> = self.store.clone();
        let trade_feed = TradeFeedClient::new(
            self.config.http_client.clone(),
            self.config.pipeline.trade_feed_url.clone(),
        );
        let joiner = JoinService::new(
            store,
            trade_feed,
            self.config.freshness_window(),
            self.config.args.skip_cache,
            self.config.pipeline.season_start_year,
        );

        let joins = joiner.run(&self.config.pipeline).await?;
        if joins.is_empty() {
            warn!("no players joined; nothing to predict");
            return Ok(());
        }

        let predictions = PredictionService::new().run(&joins);
        self.save_manifest(&predictions)?;

        for prediction in predictions.iter().take(10) {
            info!(
                player = %prediction.player,
                opponent = %prediction.opponent,
                points = format!("{:.1}", prediction.predicted_points),
                mae = format!("{:.1}", prediction.train_mae),
                "prediction"
            );
        }
        Ok(())
    }

    fn save_manifest(&self, predictions: &[Prediction]) -> Result<()> {
        let path = self
            .config
            .args
            .data_dir
            .join(format!("predictions_{}.json", Utc::now().timestamp()));
        std::fs::write(&path, serde_json::to_string_pretty(predictions)?)?;
        info!("Saved {} predictions to {}", predictions.len(), path.display());
        Ok(())
    }
}
