use crate::error::{HoopError, Result};
use crate::services::normalize::normalize_key;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use rustc_hash::FxHashMap;
use scraper::{Html, Selector};
use tracing::debug;

/// Best-effort scrape of the NBA trade-tracker article. The text patterns
/// ("Team receives: ..." and "Player to the Team") are heuristic; output
/// only ever feeds lookup overrides and an empty map is a valid result.
#[derive(Debug, Clone)]
pub struct TradeFeedClient {
    client: Client,
    url: String,
}

static RECEIVES_TEAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\w+\s*\w*)\s*receives").unwrap());
static PLAYER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z][a-z]+ [A-Z][a-z]+)").unwrap());
static TO_THE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][a-z]+ [A-Z][a-z]+)\s*to the\s*(\w+\s*\w*)").unwrap());

impl TradeFeedClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Player key -> current team slug, for players moved mid-season.
    pub async fn fetch_overrides(
        &self,
        known_teams: &[String],
    ) -> Result<FxHashMap<String, String>> {
        let body = self.client.get(&self.url).send().await?.text().await?;
        parse_overrides(&body, known_teams)
    }
}

/// Resolves a loosely-written team name ("Lakers", "Los Angeles Lakers")
/// against the configured slugs; a bare nickname matches by suffix.
fn resolve_team_slug<'a>(name: &str, known_teams: &'a [String]) -> Option<&'a str> {
    let key = normalize_key(name);
    if key.is_empty() {
        return None;
    }
    known_teams
        .iter()
        .find(|slug| **slug == key || slug.ends_with(&format!("-{key}")))
        .map(String::as_str)
}

pub(crate) fn parse_overrides(
    html: &str,
    known_teams: &[String],
) -> Result<FxHashMap<String, String>> {
    let document = Html::parse_document(html);
    // The article body class names shift between publishes; match loosely.
    let selector = Selector::parse(
        "div[class*='Article'] p, div[class*='Article'] li, \
         div[class*='TradeTracker'] p, div[class*='TradeTracker'] li",
    )
    .map_err(|e| HoopError::Selector(e.to_string()))?;

    let mut overrides = FxHashMap::default();

    for item in document.select(&selector) {
        let text = item.text().collect::<String>();
        let text = text.trim();
        let lowered = text.to_lowercase();

        if lowered.contains("receives:") {
            let Some((team_part, players_part)) = text.split_once("receives:") else {
                continue;
            };
            let team_text = format!("{team_part} receives");
            let Some(team_caps) = RECEIVES_TEAM.captures(&team_text) else {
                continue;
            };
            let Some(slug) = resolve_team_slug(&team_caps[1], known_teams) else {
                debug!(team = %&team_caps[1], "trade team not in configured set");
                continue;
            };
            for player in PLAYER_NAME.captures_iter(players_part) {
                overrides.insert(normalize_key(&player[1]), slug.to_string());
            }
        } else if lowered.contains("to the") {
            for caps in TO_THE.captures_iter(text) {
                // The capture may run one word past the nickname ("Jazz in");
                // fall back to its first word before giving up.
                let team_text = &caps[2];
                let slug = resolve_team_slug(team_text, known_teams).or_else(|| {
                    team_text
                        .split_whitespace()
                        .next()
                        .and_then(|word| resolve_team_slug(word, known_teams))
                });
                let Some(slug) = slug else {
                    continue;
                };
                overrides.insert(normalize_key(&caps[1]), slug.to_string());
            }
        }
    }

    Ok(overrides)
}
