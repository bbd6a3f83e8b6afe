use crate::config::PipelineConfig;
use crate::domain::row::NormalizedRow;
use crate::domain::schema::registry;
use crate::domain::storage::Storage;
use crate::domain::RunReport;
use crate::error::{HoopError, Result};
use crate::infrastructure::scrapers::{
    candidate_tables, ExtractMode, GamelogPage, PageSource, SplitsPage, TeamStatsPage, TrendsPage,
};
use crate::infrastructure::{EspnClient, TeamRoster};
use crate::services::extraction::TableExtractor;
use indicatif::ProgressBar;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// Fetches every configured (entity, page) pair, extracts the table, and
/// persists the dataset. One entity's failure is recorded and skipped; the
/// batch always runs to completion.
#[derive(Clone)]
pub struct ScrapeService {
    client: Client,
    store: Arc<dyn Storage>,
    /// Bounds in-flight fetches; external hosts are rate-sensitive.
    semaphore: Arc<Semaphore>,
    fetch_timeout: Duration,
}

impl ScrapeService {
    pub fn new(
        client: Client,
        store: Arc<dyn Storage>,
        max_in_flight: usize,
        fetch_timeout: Duration,
    ) -> Self {
        info!("Created new Scrape service");
        Self {
            client,
            store,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            fetch_timeout,
        }
    }

    pub async fn run(&self, config: &PipelineConfig) -> RunReport {
        let mut report = RunReport::new();

        let rosters = self.fetch_rosters(config, &mut report).await;

        info!("Scraping {} teams", rosters.len());
        let progress = ProgressBar::new(rosters.len() as u64);

        let mut tasks: JoinSet<RunReport> = JoinSet::new();
        for roster in rosters {
            let service = self.clone();
            let trend_kinds = config.trend_kinds.clone();
            tasks.spawn(async move { service.scrape_team(roster, &trend_kinds).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(team_report) => report.merge(team_report),
                Err(e) => warn!("scrape task panicked: {e}"),
            }
            progress.inc(1);
        }
        progress.finish();

        report
    }

    /// League rosters come from the ESPN API keyed by team id; the config's
    /// team slugs decide which of the 30 we keep.
    async fn fetch_rosters(
        &self,
        config: &PipelineConfig,
        report: &mut RunReport,
    ) -> Vec<TeamRoster> {
        let espn = EspnClient::new(self.client.clone());
        let schema = registry().get("roster").expect("builtin schema");

        let mut kept = Vec::new();
        for (team_id, result) in espn.fetch_all_rosters().await {
            match result {
                Ok(roster) => {
                    if !config.teams.contains(&roster.slug) {
                        continue;
                    }
                    let rows: Vec<NormalizedRow> = roster
                        .players
                        .iter()
                        .map(|p| {
                            NormalizedRow::from_raw(&[p.name.clone(), p.id.clone()], schema)
                        })
                        .collect();
                    match self.store.save_rows(&roster.slug, "roster", schema, &rows) {
                        Ok(()) => {
                            info!(team = %roster.slug, players = rows.len(), "roster saved");
                            report.record_success(format!("{} roster", roster.slug));
                            kept.push(roster);
                        }
                        Err(e) => {
                            report.record_failure(format!("{} roster", roster.slug), e.kind())
                        }
                    }
                }
                Err(e) => {
                    report.record_skip(format!("team id {team_id} roster"), e.kind());
                }
            }
        }
        kept
    }

    async fn scrape_team(&self, roster: TeamRoster, trend_kinds: &[String]) -> RunReport {
        let mut report = RunReport::new();
        let team = roster.slug.clone();

        let mut pages: Vec<Box<dyn PageSource>> = Vec::new();
        for kind in trend_kinds {
            match TrendsPage::new(&team, kind) {
                Some(page) => pages.push(Box::new(page)),
                None => warn!(team = %team, kind = %kind, "unknown trend kind"),
            }
        }
        pages.push(Box::new(TeamStatsPage::new(&team)));
        for player in &roster.players {
            pages.push(Box::new(SplitsPage::new(&team, &player.name, &player.id)));
            pages.push(Box::new(GamelogPage::new(&team, &player.name, &player.id)));
        }

        for page in pages {
            let label = format!("{} {}", page.entity(), page.category());
            match self.scrape_page(page.as_ref()).await {
                Ok(rows) => {
                    info!(entity = %label, rows, "dataset saved");
                    report.record_success(label);
                }
                Err(e) => {
                    warn!(entity = %label, error = %e, "entity skipped");
                    report.record_skip(label, e.kind());
                }
            }
            sleep(Duration::from_millis(200)).await;
        }

        report
    }

    /// Fetch, extract, persist one page. A slow page is abandoned and
    /// reported, never retried here; callers may retry with backoff.
    async fn scrape_page(&self, page: &dyn PageSource) -> Result<usize> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| HoopError::Other(e.to_string()))?;

        let url = page.url();
        let work = async {
            let body = self.client.get(&url).send().await?.text().await?;

            let schema = registry()
                .get(page.schema_name())
                .ok_or_else(|| HoopError::Other(format!("unknown schema {}", page.schema_name())))?;

            let document = Html::parse_document(&body);
            let tables = candidate_tables(&document)?;
            let rows = match page.mode() {
                ExtractMode::Rows => TableExtractor::extract(&tables, &page.hint(), schema)?,
                ExtractMode::StatSections => TableExtractor::extract_sections(&tables, schema)?,
            };

            self.store
                .save_rows(&page.entity(), page.category(), schema, &rows)?;
            Ok(rows.len())
        };

        match timeout(self.fetch_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(HoopError::Timeout(self.fetch_timeout)),
        }
    }
}
