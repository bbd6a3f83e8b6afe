use super::PageSource;
use crate::services::extraction::TableHint;
use crate::services::normalize::normalize_key;

/// ESPN player splits page. Split labels and stat rows live in sibling
/// tables, so the hint is a union over every candidate.
pub struct SplitsPage {
    team: String,
    player_name: String,
    player_id: String,
}

impl SplitsPage {
    pub fn new(
        team: impl Into<String>,
        player_name: impl Into<String>,
        player_id: impl Into<String>,
    ) -> Self {
        Self {
            team: team.into(),
            player_name: player_name.into(),
            player_id: player_id.into(),
        }
    }
}

impl PageSource for SplitsPage {
    fn url(&self) -> String {
        format!(
            "https://www.espn.com/nba/player/splits/_/id/{}/{}",
            self.player_id,
            normalize_key(&self.player_name)
        )
    }

    fn hint(&self) -> TableHint {
        TableHint::Union
    }

    fn schema_name(&self) -> &'static str {
        "splits"
    }

    fn entity(&self) -> String {
        format!("{}/{}", self.team, normalize_key(&self.player_name))
    }
}

/// ESPN player game-log page; one table per month, unioned.
pub struct GamelogPage {
    team: String,
    player_name: String,
    player_id: String,
}

impl GamelogPage {
    pub fn new(
        team: impl Into<String>,
        player_name: impl Into<String>,
        player_id: impl Into<String>,
    ) -> Self {
        Self {
            team: team.into(),
            player_name: player_name.into(),
            player_id: player_id.into(),
        }
    }
}

impl PageSource for GamelogPage {
    fn url(&self) -> String {
        format!(
            "https://www.espn.com/nba/player/gamelog/_/id/{}/{}",
            self.player_id,
            normalize_key(&self.player_name)
        )
    }

    fn hint(&self) -> TableHint {
        TableHint::Union
    }

    fn schema_name(&self) -> &'static str {
        "gamelog"
    }

    fn entity(&self) -> String {
        format!("{}/{}", self.team, normalize_key(&self.player_name))
    }
}
