use chrono::Weekday;
use serde::Serialize;

/// Assembled input for one inference: constructed by the joiner, consumed
/// by a predictor, and discarded. Rows with any missing required feature
/// are dropped upstream, never zero-filled.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    pub avg_pts_last5: f64,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub home: bool,
    pub opp_def_pts_allowed: f64,
}

/// One historical game with its realized points, used to fit a predictor.
#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub features: FeatureRow,
    pub pts: f64,
}

pub fn day_index(day: Weekday) -> u8 {
    day.num_days_from_monday() as u8
}
