use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Pattern the first cell of a data row must match during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingToken {
    /// First cell is all digits (splits stat rows: games played).
    Numeric,
    /// First cell is a weekday abbreviation plus a date, e.g. "Mon 11/4".
    WeekdayDate,
    /// Any multi-cell row counts as data (trend tables).
    AnyText,
}

/// Declares the shape a scraped table is normalized into.
///
/// Schemas are data, not code: the built-in registry below replaces the
/// column lists that used to be copy-pasted into every per-team script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedSchema {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub columns: Vec<String>,
    /// Fill value for missing/short cells.
    pub sentinel: String,
    pub leading_token: LeadingToken,
    /// Known category labels. For preset-category schemas (splits) the
    /// output contains exactly one row per entry here, in this order; for
    /// section-flattened schemas (team stats) only tables titled with one
    /// of these are read.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Default stat values (one per non-category column) used for categories
    /// absent from the page. Falls back to `sentinel` when empty.
    #[serde(default)]
    pub category_defaults: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl ExpectedSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Default stat row for an absent category (category column excluded).
    pub fn default_stats(&self) -> Vec<String> {
        if self.category_defaults.len() == self.columns.len() - 1 {
            self.category_defaults.clone()
        } else {
            vec![self.sentinel.clone(); self.columns.len().saturating_sub(1)]
        }
    }
}

pub struct SchemaRegistry {
    schemas: FxHashMap<String, ExpectedSchema>,
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::builtin);

pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

impl SchemaRegistry {
    pub fn get(&self, name: &str) -> Option<&ExpectedSchema> {
        self.schemas.get(name)
    }

    fn builtin() -> Self {
        let mut schemas = FxHashMap::default();
        for schema in [
            gamelog(),
            splits(),
            trend_table("ats-trends", "ATS Record", "Cover %", "ATS +/-"),
            trend_table("over-under-trends", "Over/Under Record", "Over/Under %", "Over/Under +/-"),
            trend_table("win-trends", "Win Record", "Win %", "Win +/-"),
            team_stats(),
            roster(),
        ] {
            schemas.insert(schema.name.clone(), schema);
        }
        Self { schemas }
    }
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn gamelog() -> ExpectedSchema {
    ExpectedSchema {
        name: "gamelog".to_string(),
        version: 1,
        columns: cols(&[
            "DATE", "OPP", "RESULT", "MIN", "FGM-FGA", "FG%", "3PM-3PA", "3P%", "FTM-FTA",
            "FT%", "REB", "AST", "STL", "BLK", "TO", "PF", "PTS",
        ]),
        sentinel: "N/A".to_string(),
        leading_token: LeadingToken::WeekdayDate,
        categories: Vec::new(),
        category_defaults: Vec::new(),
    }
}

fn splits() -> ExpectedSchema {
    let categories = [
        "All Splits", "Home", "Road", "vs. Division", "vs. Conference", "3+ Days Rest",
        "October", "November", "December", "January", "February", "March",
        "Pre All-Star", "Post All-Star", "Wins", "Losses", "As Starter",
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
        "vs ATL", "vs BOS", "vs CHA", "vs CHI", "vs CLE", "vs DAL", "vs DEN", "vs DET",
        "vs GS", "vs HOU", "vs LAC", "vs LAL", "vs MEM", "vs MIA", "vs MIL", "vs NO",
        "vs NY", "vs ORL", "vs PHI", "vs PHO", "vs POR", "vs SA", "vs SAC", "vs OKC",
        "vs TOR", "vs UTA", "vs WAS",
    ];
    let defaults = [
        "0", "0.0", "0.0-0.0", "0.0", "0.0-0.0", "0.0", "0.0-0.0", "0.0", "0.0", "0.0",
        "0.0", "0.0", "0.0", "0.0", "0.0", "0.0", "0.0",
    ];
    ExpectedSchema {
        name: "splits".to_string(),
        version: 1,
        columns: cols(&[
            "SPLIT", "GP", "MIN", "FG", "FG%", "3PT", "3P%", "FT", "FT%", "OR", "DR",
            "REB", "AST", "BLK", "STL", "PF", "TO", "PTS",
        ]),
        sentinel: "N/A".to_string(),
        leading_token: LeadingToken::Numeric,
        categories: categories.iter().map(|s| s.to_string()).collect(),
        category_defaults: defaults.iter().map(|s| s.to_string()).collect(),
    }
}

fn trend_table(name: &str, record: &str, pct: &str, plus_minus: &str) -> ExpectedSchema {
    ExpectedSchema {
        name: name.to_string(),
        version: 1,
        columns: cols(&["Trend", record, pct, "MOV", plus_minus]),
        sentinel: "N/A".to_string(),
        leading_token: LeadingToken::AnyText,
        categories: Vec::new(),
        category_defaults: Vec::new(),
    }
}

fn team_stats() -> ExpectedSchema {
    // The eight h2 section headings on the teamrankings stats page; anything
    // else titling a table there is page chrome.
    let sections = [
        "Overall Statistics",
        "Shooting Statistics",
        "Scoring Statistics",
        "Rebounding Statistics",
        "Blocks Statistics",
        "Steals Statistics",
        "Turnovers Statistics",
        "Fouls Statistics",
    ];
    ExpectedSchema {
        name: "stats".to_string(),
        version: 1,
        columns: cols(&["Category", "Stat", "Value (rank)"]),
        sentinel: "N/A".to_string(),
        leading_token: LeadingToken::AnyText,
        categories: sections.iter().map(|s| s.to_string()).collect(),
        category_defaults: Vec::new(),
    }
}

fn roster() -> ExpectedSchema {
    ExpectedSchema {
        name: "roster".to_string(),
        version: 1,
        columns: cols(&["Player Name", "Player ID"]),
        sentinel: "N/A".to_string(),
        leading_token: LeadingToken::AnyText,
        categories: Vec::new(),
        category_defaults: Vec::new(),
    }
}
