use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use unicode_normalization::UnicodeNormalization;

/// Opponent abbreviations as they appear in ESPN game logs, mapped to the
/// slugs used in teamrankings URLs and as join keys.
pub static ABBR_TO_SLUG: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    FxHashMap::from_iter([
        ("ATL", "atlanta-hawks"),
        ("BOS", "boston-celtics"),
        ("BKN", "brooklyn-nets"),
        ("CHA", "charlotte-hornets"),
        ("CHI", "chicago-bulls"),
        ("CLE", "cleveland-cavaliers"),
        ("DAL", "dallas-mavericks"),
        ("DEN", "denver-nuggets"),
        ("DET", "detroit-pistons"),
        ("GSW", "golden-state-warriors"),
        ("HOU", "houston-rockets"),
        ("IND", "indiana-pacers"),
        ("LAC", "los-angeles-clippers"),
        ("LAL", "los-angeles-lakers"),
        ("MEM", "memphis-grizzlies"),
        ("MIA", "miami-heat"),
        ("MIL", "milwaukee-bucks"),
        ("MIN", "minnesota-timberwolves"),
        ("NOP", "new-orleans-pelicans"),
        ("NYK", "new-york-knicks"),
        ("OKC", "oklahoma-city-thunder"),
        ("ORL", "orlando-magic"),
        ("PHI", "philadelphia-76ers"),
        ("PHX", "phoenix-suns"),
        ("POR", "portland-trail-blazers"),
        ("SAC", "sacramento-kings"),
        ("SAS", "san-antonio-spurs"),
        ("TOR", "toronto-raptors"),
        ("UTA", "utah-jazz"),
        ("WAS", "washington-wizards"),
    ])
});

static NON_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static KEY_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Normalizes a human-readable name into an entity key: unicode-decomposed,
/// lower-cased, punctuation stripped, whitespace collapsed to single hyphens.
///
/// The defining invariant is that this is a pure, idempotent function; it is
/// the only way keys are produced anywhere in the pipeline.
pub fn normalize_key(name: &str) -> String {
    let decomposed: String = name.nfkd().filter(|c| c.is_ascii()).collect();
    let lowered = decomposed.to_lowercase().replace('_', " ");
    let stripped = NON_KEY_CHARS.replace_all(&lowered, "");
    KEY_SEPARATORS
        .replace_all(stripped.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// Resolves a compact game-log date token like "Mon 3/9" to a weekday.
/// Months from October onward belong to the season's start year, earlier
/// months to the following year. Returns `None` on anything malformed.
pub fn resolve_day_of_week(date_token: &str, season_start_year: i32) -> Option<Weekday> {
    let mut parts = date_token.split_whitespace();
    let _day_abbr = parts.next()?;
    let date_part = parts.next()?;

    let (month_str, day_str) = date_part.split_once('/')?;
    let month: u32 = month_str.parse().ok()?;
    let day: u32 = day_str.parse().ok()?;

    let year = if month >= 10 {
        season_start_year
    } else {
        season_start_year + 1
    };

    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday())
}

/// Splits a game-log opponent field into (home, abbreviation):
/// "vsDEN" / "vs DEN" are home games, "@BOS" is away.
pub fn parse_opponent(raw: &str) -> Option<(bool, String)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (home, rest) = if let Some(rest) = trimmed.strip_prefix("vs") {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix('@') {
        (false, rest)
    } else {
        (true, trimmed)
    };
    let abbr = rest.trim().to_uppercase();
    if abbr.is_empty() {
        None
    } else {
        Some((home, abbr))
    }
}

/// Maps an opponent field straight to a team slug, stripping the
/// "vs"/"@" prefix first.
pub fn opponent_slug(raw: &str) -> Option<&'static str> {
    let (_, abbr) = parse_opponent(raw)?;
    ABBR_TO_SLUG.get(abbr.as_str()).copied()
}

static VALUE_RANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*(?:\((#\d+)\))?$").unwrap());

/// Splits teamrankings cells like "109.2 (#6)" into ("109.2", Some("#6")).
pub fn split_value_and_rank(cell: &str) -> (String, Option<String>) {
    let cell = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    match VALUE_RANK.captures(&cell) {
        Some(caps) => {
            let value = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let rank = caps.get(2).map(|m| m.as_str().to_string());
            (value, rank)
        }
        None => (cell, None),
    }
}

/// Parses a stat cell to a number, tolerating a leading label ("PTS: 28")
/// and a trailing rank ("109.2 (#6)").
pub fn parse_stat_number(cell: &str) -> Option<f64> {
    let unlabeled = cell.rsplit(':').next().unwrap_or(cell).trim();
    let (value, _) = split_value_and_rank(unlabeled);
    value.parse().ok()
}
