use crate::error::Result;
use crate::services::normalize::normalize_key;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// ESPN roster API client. Team ids run 1..=30; the slug is derived from
/// the response, not guessed from the id.
#[derive(Debug, Clone)]
pub struct EspnClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    team: TeamInfo,
    #[serde(default)]
    athletes: Vec<Athlete>,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    #[serde(default)]
    location: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Athlete {
    id: Option<String>,
    #[serde(rename = "fullName")]
    full_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RosterPlayer {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct TeamRoster {
    pub slug: String,
    pub players: Vec<RosterPlayer>,
}

impl EspnClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_roster(&self, team_id: u32) -> Result<TeamRoster> {
        let url = format!(
            "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/teams/{team_id}/roster"
        );
        let response: RosterResponse = self.client.get(&url).send().await?.json().await?;

        let slug = normalize_key(&format!(
            "{} {}",
            response.team.location, response.team.name
        ));

        let players = response
            .athletes
            .into_iter()
            .filter_map(|athlete| match (athlete.id, athlete.full_name) {
                (Some(id), Some(name)) => Some(RosterPlayer { name, id }),
                _ => {
                    warn!(team = %slug, "roster entry missing id or name");
                    None
                }
            })
            .collect();

        Ok(TeamRoster { slug, players })
    }

    /// Fetch every league roster, skipping teams that fail.
    pub async fn fetch_all_rosters(&self) -> Vec<(u32, Result<TeamRoster>)> {
        let mut rosters = Vec::with_capacity(30);
        for team_id in 1..=30 {
            rosters.push((team_id, self.fetch_roster(team_id).await));
        }
        rosters
    }
}
