use crate::config::{PipelineConfig, UpcomingGame};
use crate::domain::features::{day_index, FeatureRow, TrainingRow};
use crate::domain::lookup::LookupTable;
use crate::domain::schema::registry;
use crate::domain::storage::{CacheState, Storage};
use crate::error::{HoopError, Result};
use crate::infrastructure::TradeFeedClient;
use crate::services::normalize::{
    normalize_key, opponent_slug, parse_opponent, parse_stat_number, resolve_day_of_week,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;
use strsim::normalized_levenshtein;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const OPP_DEF_FIELD: &str = "Overall Statistics|Opp Points/Game";
const ROLLING_WINDOW: usize = 5;
/// Trade-feed names are free text; accept near-exact roster keys only.
const KEY_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinStage {
    Idle,
    LoadingLookups,
    Joining,
    Done,
}

/// A player's current team after roster + trade-feed reconciliation.
#[derive(Debug, Clone)]
pub struct PlayerAssignment {
    pub name: String,
    pub key: String,
    pub team: String,
}

/// Everything the prediction step needs for one player's next game.
#[derive(Debug)]
pub struct PlayerJoin {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub date: String,
    pub training: Vec<TrainingRow>,
    pub next: FeatureRow,
}

/// Enriches per-player game logs with team-level lookups and resolves team
/// assignments, trade feed taking priority over rosters. Lookup tables are
/// loaded once per run and only read afterwards.
pub struct JoinService {
    store: Arc<dyn Storage>,
    trade_feed: TradeFeedClient,
    freshness: Duration,
    skip_cache: bool,
    season_start_year: i32,
    /// Single-flight guard: concurrent callers must not rebuild the trade
    /// cache twice within one freshness window.
    trade_guard: Mutex<()>,
}

impl JoinService {
    pub fn new(
        store: Arc<dyn Storage>,
        trade_feed: TradeFeedClient,
        freshness: Duration,
        skip_cache: bool,
        season_start_year: i32,
    ) -> Self {
        info!("Created new Join service");
        Self {
            store,
            trade_feed,
            freshness,
            skip_cache,
            season_start_year,
            trade_guard: Mutex::new(()),
        }
    }

    pub async fn run(&self, config: &PipelineConfig) -> Result<Vec<PlayerJoin>> {
        let mut stage = JoinStage::Idle;
        Self::advance(&mut stage, JoinStage::LoadingLookups);

        let overrides = self.trade_overrides(&config.teams).await;
        let mut assignments = self.roster_assignments(&config.teams)?;
        Self::apply_overrides(&mut assignments, &overrides);
        let team_stats = self.team_stats_lookup()?;

        Self::advance(&mut stage, JoinStage::Joining);

        let mut joins = Vec::new();
        for game in &config.upcoming_games {
            for assignment in assignments.values().filter(|a| a.team == game.team) {
                match self.assemble_player(assignment, game, &team_stats) {
                    Some(join) => joins.push(join),
                    None => debug!(
                        player = %assignment.name,
                        team = %assignment.team,
                        "excluded: incomplete features"
                    ),
                }
            }
        }

        Self::advance(&mut stage, JoinStage::Done);
        Ok(joins)
    }

    fn advance(stage: &mut JoinStage, next: JoinStage) {
        info!(from = ?stage, to = ?next, "join stage");
        *stage = next;
    }

    /// Trade-feed overrides with the run's only caching policy: at most one
    /// rebuild per freshness window, prior cache served with a warning when
    /// a rebuild fails. Best-effort by design; empty is a valid answer.
    pub async fn trade_overrides(&self, known_teams: &[String]) -> FxHashMap<String, String> {
        let _flight = self.trade_guard.lock().await;

        if !self.skip_cache {
            match self.store.load_cache("trade_feed", self.freshness) {
                Ok(CacheState::Fresh(value)) => {
                    info!("Using cached trade data");
                    return decode_overrides(value);
                }
                Ok(_) => {}
                Err(e) => warn!("trade cache unreadable: {e}"),
            }
        }

        match self.trade_feed.fetch_overrides(known_teams).await {
            Ok(overrides) => {
                if let Ok(payload) = serde_json::to_value(&overrides) {
                    if let Err(e) = self.store.save_cache("trade_feed", &payload) {
                        warn!("trade cache write failed: {e}");
                    }
                }
                info!(players = overrides.len(), "trade feed rebuilt");
                overrides
            }
            Err(e) => {
                let rebuild = HoopError::CacheRebuild {
                    cache: "trade_feed".to_string(),
                    reason: e.to_string(),
                };
                warn!("{rebuild}");
                match self.store.load_cache("trade_feed", self.freshness) {
                    Ok(CacheState::Stale(value)) => {
                        warn!("serving stale trade cache");
                        decode_overrides(value)
                    }
                    _ => FxHashMap::default(),
                }
            }
        }
    }

    fn roster_assignments(
        &self,
        teams: &[String],
    ) -> Result<FxHashMap<String, PlayerAssignment>> {
        let schema = registry().get("roster").expect("builtin schema");
        let mut assignments = FxHashMap::default();

        for team in teams {
            let Some(rows) = self.store.load_rows(team, "roster", schema)? else {
                warn!(team = %team, "no roster dataset");
                continue;
            };
            for row in rows {
                if let Some(name) = row.get(schema, "Player Name") {
                    let key = normalize_key(name);
                    assignments.insert(
                        key.clone(),
                        PlayerAssignment {
                            name: name.to_string(),
                            key,
                            team: team.clone(),
                        },
                    );
                }
            }
        }

        Ok(assignments)
    }

    /// Trade feed wins over roster. Feed names that miss every roster key
    /// exactly get one fuzzy chance before being added as new assignments.
    pub fn apply_overrides(
        assignments: &mut FxHashMap<String, PlayerAssignment>,
        overrides: &FxHashMap<String, String>,
    ) {
        for (key, new_team) in overrides {
            if let Some(assignment) = assignments.get_mut(key) {
                if &assignment.team != new_team {
                    info!(
                        player = %assignment.name,
                        from = %assignment.team,
                        to = %new_team,
                        "trade override"
                    );
                    assignment.team = new_team.clone();
                }
                continue;
            }

            let fuzzy = assignments
                .values()
                .map(|a| (a.key.clone(), normalized_levenshtein(key, &a.key)))
                .filter(|(_, score)| *score > KEY_SIMILARITY_THRESHOLD)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((matched_key, _)) = fuzzy {
                if let Some(assignment) = assignments.get_mut(&matched_key) {
                    if &assignment.team != new_team {
                        info!(
                            player = %assignment.name,
                            from = %assignment.team,
                            to = %new_team,
                            "trade override (fuzzy key match)"
                        );
                        assignment.team = new_team.clone();
                    }
                }
                continue;
            }

            // Traded onto a configured team but absent from every roster.
            let name = key
                .split('-')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            info!(player = %name, team = %new_team, "trade adds unrostered player");
            assignments.insert(
                key.clone(),
                PlayerAssignment {
                    name,
                    key: key.clone(),
                    team: new_team.clone(),
                },
            );
        }
    }

    /// Opponent defensive stats per team slug, flattened to
    /// "Category|Stat" fields.
    pub fn team_stats_lookup(&self) -> Result<LookupTable> {
        let schema = registry().get("stats").expect("builtin schema");
        let mut table = LookupTable::new("team_stats");

        for team in self.store.list_entities("stats")? {
            let Some(rows) = self.store.load_rows(&team, "stats", schema)? else {
                continue;
            };
            for row in rows {
                if let (Some(category), Some(stat), Some(value)) = (
                    row.get(schema, "Category"),
                    row.get(schema, "Stat"),
                    row.get(schema, "Value (rank)"),
                ) {
                    table.insert_field(team.clone(), format!("{category}|{stat}"), value);
                }
            }
        }

        info!(teams = table.len(), "team stats lookup loaded");
        Ok(table)
    }

    /// Builds the per-player training set and next-game features. Any row
    /// missing a required feature is dropped, not zero-filled; a player with
    /// no usable history or an unresolvable next game is excluded entirely.
    pub fn assemble_player(
        &self,
        assignment: &PlayerAssignment,
        game: &UpcomingGame,
        team_stats: &LookupTable,
    ) -> Option<PlayerJoin> {
        let schema = registry().get("gamelog").expect("builtin schema");
        let entity = format!("{}/{}", assignment.team, assignment.key);

        let rows = match self.store.load_rows(&entity, "gamelog", schema) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                debug!(entity = %entity, "no game log dataset");
                return None;
            }
            Err(e) => {
                warn!(entity = %entity, error = %e, "game log unreadable");
                return None;
            }
        };

        let mut history: Vec<f64> = Vec::new();
        let mut training = Vec::new();

        for row in &rows {
            let pts = row.get(schema, "PTS").and_then(parse_stat_number);
            let features = self.game_features(
                row.get(schema, "DATE"),
                row.get(schema, "OPP"),
                &history,
                team_stats,
            );

            if let (Some(pts), Some(features)) = (pts, features) {
                training.push(TrainingRow { features, pts });
            }
            if let Some(pts) = pts {
                history.push(pts);
            }
        }

        let next = self.game_features(
            Some(game.date.as_str()),
            Some(game.opponent.as_str()),
            &history,
            team_stats,
        )?;

        if training.is_empty() {
            debug!(entity = %entity, "no complete training rows");
            return None;
        }

        Some(PlayerJoin {
            player: assignment.name.clone(),
            team: assignment.team.clone(),
            opponent: game.opponent.clone(),
            date: game.date.clone(),
            training,
            next,
        })
    }

    fn game_features(
        &self,
        date: Option<&str>,
        opponent: Option<&str>,
        history: &[f64],
        team_stats: &LookupTable,
    ) -> Option<FeatureRow> {
        if history.is_empty() {
            return None;
        }
        let recent = &history[history.len().saturating_sub(ROLLING_WINDOW)..];
        let avg_pts_last5 = recent.iter().sum::<f64>() / recent.len() as f64;

        let day = resolve_day_of_week(date?, self.season_start_year)?;
        let (home, _) = parse_opponent(opponent?)?;

        let slug = opponent_slug(opponent?)?;
        let opp_def_pts_allowed = match team_stats.field(slug, OPP_DEF_FIELD) {
            Some(value) => parse_stat_number(value)?,
            None => {
                let miss = HoopError::LookupMiss {
                    table: team_stats.name().to_string(),
                    key: slug.to_string(),
                };
                debug!("dropping row: {miss}");
                return None;
            }
        };

        Some(FeatureRow {
            avg_pts_last5,
            day_of_week: day_index(day),
            home,
            opp_def_pts_allowed,
        })
    }
}

fn decode_overrides(value: serde_json::Value) -> FxHashMap<String, String> {
    serde_json::from_value(value).unwrap_or_default()
}
