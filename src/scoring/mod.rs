//! Wave quality scoring
//!
//! A [`QualityScorer`] turns one merged hour into a score in [1, 10]. The
//! heuristic scorer needs no artifacts; the model-backed scorer delegates to a
//! [`Predictor`] fed with a pinned feature order.

pub mod heuristic;
pub mod model;

pub use heuristic::HeuristicScorer;
pub use model::{MlpPredictor, ModelScorer, Predictor};

use crate::config::{ScoringConfig, ScoringMode};
use crate::models::ForecastRow;
use crate::variables::{SEA_LEVEL_HEIGHT_MSL, SWELL_WAVE_HEIGHT, SWELL_WAVE_PERIOD, WIND_SPEED_10M};
use crate::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// Feature order a model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    #[default]
    Swell,
    SwellWithTide,
}

impl FeatureSet {
    /// The pinned input order for this set
    #[must_use]
    pub fn order(self) -> &'static [&'static str] {
        match self {
            FeatureSet::Swell => &[SWELL_WAVE_HEIGHT, SWELL_WAVE_PERIOD, WIND_SPEED_10M],
            FeatureSet::SwellWithTide => &[
                SWELL_WAVE_HEIGHT,
                SWELL_WAVE_PERIOD,
                WIND_SPEED_10M,
                SEA_LEVEL_HEIGHT_MSL,
            ],
        }
    }
}

/// Scoring strategy selected by configuration
#[derive(Clone)]
pub enum QualityScorer {
    Heuristic(HeuristicScorer),
    Model(ModelScorer),
}

impl std::fmt::Debug for QualityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityScorer::Heuristic(h) => f.debug_tuple("Heuristic").field(h).finish(),
            QualityScorer::Model(m) => f
                .debug_struct("Model")
                .field("feature_set", &m.feature_set())
                .finish_non_exhaustive(),
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        QualityScorer::Heuristic(HeuristicScorer::default())
    }
}

impl QualityScorer {
    /// Build the scorer named by `config`.
    ///
    /// In model mode every artifact must load; there is no fallback to the heuristic.
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        match config.mode {
            ScoringMode::Heuristic => Ok(QualityScorer::default()),
            ScoringMode::Model => {
                let (model, scaler_x, scaler_y) = config.artifact_paths();
                let predictor =
                    MlpPredictor::load(&model, &scaler_x, &scaler_y, config.feature_set)?;
                info!(
                    "Loaded quality model from {} ({:?} features)",
                    model.display(),
                    config.feature_set
                );
                Ok(QualityScorer::Model(ModelScorer::new(
                    config.feature_set,
                    Arc::new(predictor),
                )))
            }
        }
    }

    /// Features a row must carry to be scored
    #[must_use]
    pub fn required_features(&self) -> &'static [&'static str] {
        match self {
            QualityScorer::Heuristic(_) => HeuristicScorer::REQUIRED,
            QualityScorer::Model(m) => m.feature_set().order(),
        }
    }

    /// Whether scoring needs the tide column fetched
    #[must_use]
    pub fn requires_sea_level(&self) -> bool {
        self.required_features().contains(&SEA_LEVEL_HEIGHT_MSL)
    }

    /// Score one merged hour
    pub fn score(&self, row: &ForecastRow) -> Result<f64> {
        let features = extract(row, self.required_features())?;
        match self {
            QualityScorer::Heuristic(h) => Ok(h.score(features[0], features[1], features[2])),
            QualityScorer::Model(m) => m.score(&features),
        }
    }
}

/// Pull `names` from `row` in order, naming every absent one on failure
fn extract(row: &ForecastRow, names: &[&str]) -> Result<Vec<f64>> {
    let missing = row.missing(names);
    if !missing.is_empty() {
        return Err(ForecastError::missing_features(missing));
    }
    Ok(names.iter().filter_map(|name| row.value(name)).collect())
}

pub(crate) fn clamp_score(raw: f64) -> f64 {
    raw.clamp(MIN_SCORE, MAX_SCORE)
}
