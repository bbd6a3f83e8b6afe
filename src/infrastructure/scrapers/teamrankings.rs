use super::{ExtractMode, PageSource};
use crate::services::extraction::TableHint;

/// teamrankings.com situational trend pages (ats-trends, over-under-trends,
/// win-trends). The data table carries a "tr-table" class.
pub struct TrendsPage {
    team: String,
    kind: &'static str,
}

impl TrendsPage {
    pub fn new(team: impl Into<String>, kind: &str) -> Option<Self> {
        let kind = match kind {
            "ats-trends" => "ats-trends",
            "over-under-trends" => "over-under-trends",
            "win-trends" => "win-trends",
            _ => return None,
        };
        Some(Self {
            team: team.into(),
            kind,
        })
    }
}

impl PageSource for TrendsPage {
    fn url(&self) -> String {
        format!(
            "https://www.teamrankings.com/nba/team/{}/{}",
            self.team, self.kind
        )
    }

    fn hint(&self) -> TableHint {
        TableHint::ClassContains("tr-table".to_string())
    }

    fn schema_name(&self) -> &'static str {
        self.kind
    }

    fn entity(&self) -> String {
        self.team.clone()
    }
}

/// teamrankings.com team stat summary page: one h2-titled table per stat
/// section, flattened to (Category, Stat, Value (rank)) rows.
pub struct TeamStatsPage {
    team: String,
}

impl TeamStatsPage {
    pub fn new(team: impl Into<String>) -> Self {
        Self { team: team.into() }
    }
}

impl PageSource for TeamStatsPage {
    fn url(&self) -> String {
        format!("https://www.teamrankings.com/nba/team/{}/stats", self.team)
    }

    fn hint(&self) -> TableHint {
        TableHint::Union
    }

    fn mode(&self) -> ExtractMode {
        ExtractMode::StatSections
    }

    fn schema_name(&self) -> &'static str {
        "stats"
    }

    fn entity(&self) -> String {
        self.team.clone()
    }
}
