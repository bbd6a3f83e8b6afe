use crate::domain::features::{FeatureRow, TrainingRow};
use crate::services::joining::PlayerJoin;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Fits on a player's historical games and scores the next one.
/// Implementations must be cheap to fit; the service fits one model per
/// player on every run.
pub trait Predictor: Send + Sync {
    fn fit(&mut self, training: &[TrainingRow]);
    fn predict(&self, features: &FeatureRow) -> f64;

    /// Mean absolute error over a training set, for reporting.
    fn mae(&self, training: &[TrainingRow]) -> f64 {
        if training.is_empty() {
            return 0.0;
        }
        let total: f64 = training
            .iter()
            .map(|row| (self.predict(&row.features) - row.pts).abs())
            .sum();
        total / training.len() as f64
    }
}

/// Scales recent scoring by how permissive the opponent's defense is
/// relative to the defenses already faced, plus a fitted home/away offset.
/// Transparent on purpose; every term is inspectable in the output.
#[derive(Debug, Clone, Default)]
pub struct LeagueAdjustedModel {
    league_def: f64,
    home_offset: f64,
    away_offset: f64,
}

impl LeagueAdjustedModel {
    fn baseline(&self, features: &FeatureRow) -> f64 {
        if self.league_def <= 0.0 {
            return features.avg_pts_last5;
        }
        features.avg_pts_last5 * (features.opp_def_pts_allowed / self.league_def)
    }

    fn mean_residual(&self, rows: &[&TrainingRow]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let total: f64 = rows
            .iter()
            .map(|row| row.pts - self.baseline(&row.features))
            .sum();
        total / rows.len() as f64
    }
}

impl Predictor for LeagueAdjustedModel {
    fn fit(&mut self, training: &[TrainingRow]) {
        if training.is_empty() {
            return;
        }
        self.league_def = training
            .iter()
            .map(|row| row.features.opp_def_pts_allowed)
            .sum::<f64>()
            / training.len() as f64;

        let (home, away): (Vec<_>, Vec<_>) =
            training.iter().partition(|row| row.features.home);
        self.home_offset = self.mean_residual(&home);
        self.away_offset = self.mean_residual(&away);
    }

    fn predict(&self, features: &FeatureRow) -> f64 {
        let offset = if features.home {
            self.home_offset
        } else {
            self.away_offset
        };
        self.baseline(features) + offset
    }
}

/// One scored upcoming game, as published in the predictions manifest.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub date: String,
    pub predicted_points: f64,
    pub train_mae: f64,
    pub games_trained_on: usize,
}

/// Fits one model per joined player and publishes predictions sorted by
/// predicted points, highest first.
pub struct PredictionService;

impl PredictionService {
    pub fn new() -> Self {
        info!("Created new Prediction service");
        Self
    }

    pub fn run(&self, joins: &[PlayerJoin]) -> Vec<Prediction> {
        let mut predictions: Vec<Prediction> = joins
            .par_iter()
            .map(|join| {
                let mut model = LeagueAdjustedModel::default();
                model.fit(&join.training);
                let predicted = model.predict(&join.next);
                debug!(
                    player = %join.player,
                    predicted = format!("{predicted:.1}"),
                    games = join.training.len(),
                    "scored player"
                );
                Prediction {
                    player: join.player.clone(),
                    team: join.team.clone(),
                    opponent: join.opponent.clone(),
                    date: join.date.clone(),
                    predicted_points: predicted,
                    train_mae: model.mae(&join.training),
                    games_trained_on: join.training.len(),
                }
            })
            .collect();

        predictions.sort_by(|a, b| {
            b.predicted_points
                .partial_cmp(&a.predicted_points)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        info!(players = predictions.len(), "predictions ready");
        predictions
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(avg: f64, home: bool, opp_def: f64, pts: f64) -> TrainingRow {
        TrainingRow {
            features: FeatureRow {
                avg_pts_last5: avg,
                day_of_week: 0,
                home,
                opp_def_pts_allowed: opp_def,
            },
            pts,
        }
    }

    #[test]
    fn baseline_scales_with_opponent_defense() {
        let mut model = LeagueAdjustedModel::default();
        // Two opponents, one average (110) and one leaky (120); residuals
        // are zero so offsets vanish.
        model.fit(&[
            row(20.0, true, 110.0, 20.0 * (110.0 / 115.0)),
            row(20.0, true, 120.0, 20.0 * (120.0 / 115.0)),
        ]);

        let soft = model.predict(&FeatureRow {
            avg_pts_last5: 20.0,
            day_of_week: 2,
            home: true,
            opp_def_pts_allowed: 120.0,
        });
        let stingy = model.predict(&FeatureRow {
            avg_pts_last5: 20.0,
            day_of_week: 2,
            home: true,
            opp_def_pts_allowed: 105.0,
        });
        assert!(soft > stingy);
    }

    #[test]
    fn home_offset_is_learned_from_residuals() {
        let mut model = LeagueAdjustedModel::default();
        // Same defense everywhere; the player scores 4 above baseline at
        // home and exactly baseline away.
        model.fit(&[
            row(25.0, true, 110.0, 29.0),
            row(25.0, true, 110.0, 29.0),
            row(25.0, false, 110.0, 25.0),
            row(25.0, false, 110.0, 25.0),
        ]);

        let features = |home| FeatureRow {
            avg_pts_last5: 25.0,
            day_of_week: 4,
            home,
            opp_def_pts_allowed: 110.0,
        };
        let home = model.predict(&features(true));
        let away = model.predict(&features(false));
        assert!((home - 29.0).abs() < 1e-9);
        assert!((away - 25.0).abs() < 1e-9);
    }

    #[test]
    fn unfitted_model_falls_back_to_recent_average() {
        let model = LeagueAdjustedModel::default();
        let predicted = model.predict(&FeatureRow {
            avg_pts_last5: 22.5,
            day_of_week: 1,
            home: false,
            opp_def_pts_allowed: 110.0,
        });
        assert_eq!(predicted, 22.5);
    }

    #[test]
    fn mae_reports_mean_absolute_error() {
        let mut model = LeagueAdjustedModel::default();
        let training = vec![
            row(20.0, true, 110.0, 24.0),
            row(20.0, true, 110.0, 16.0),
        ];
        model.fit(&training);
        // Offsets absorb the mean; residuals are symmetric around it.
        assert!((model.mae(&training) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn predictions_sort_highest_first() {
        let join = |player: &str, avg: f64| PlayerJoin {
            player: player.to_string(),
            team: "boston-celtics".to_string(),
            opponent: "@DEN".to_string(),
            date: "Fri 11/8".to_string(),
            training: vec![row(avg, false, 110.0, avg)],
            next: FeatureRow {
                avg_pts_last5: avg,
                day_of_week: 4,
                home: false,
                opp_def_pts_allowed: 110.0,
            },
        };

        let service = PredictionService::new();
        let predictions = service.run(&[
            join("Role Player", 8.0),
            join("Star", 30.0),
            join("Starter", 18.0),
        ]);

        let names: Vec<&str> = predictions.iter().map(|p| p.player.as_str()).collect();
        assert_eq!(names, vec!["Star", "Starter", "Role Player"]);
    }
}
