//! Closed-form wave quality score
//!
//! Each input is normalized to a 0..10 scale against a reference cap, then
//! combined: bigger and longer swell helps, wind hurts.

use super::clamp_score;
use crate::variables::{SWELL_WAVE_HEIGHT, SWELL_WAVE_PERIOD, WIND_SPEED_10M};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScorer {
    /// Swell height (m) that maps to 10
    pub height_cap: f64,
    /// Swell period (s) that maps to 10
    pub period_cap: f64,
    /// Wind speed (km/h) that maps to 10
    pub wind_cap: f64,
    pub height_weight: f64,
    pub period_weight: f64,
    pub wind_weight: f64,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self {
            height_cap: 3.0,
            period_cap: 15.0,
            wind_cap: 30.0,
            height_weight: 0.5,
            period_weight: 0.4,
            wind_weight: -0.1,
        }
    }
}

impl HeuristicScorer {
    pub const REQUIRED: &'static [&'static str] =
        &[SWELL_WAVE_HEIGHT, SWELL_WAVE_PERIOD, WIND_SPEED_10M];

    /// Score in [1, 10]. Normalized inputs are floored at zero but not capped,
    /// so large swell can push the raw value past 10 before clamping.
    #[must_use]
    pub fn score(&self, height: f64, period: f64, wind: f64) -> f64 {
        let h = normalize(height, self.height_cap);
        let p = normalize(period, self.period_cap);
        let w = normalize(wind, self.wind_cap);
        clamp_score(self.height_weight * h + self.period_weight * p + self.wind_weight * w)
    }
}

fn normalize(value: f64, cap: f64) -> f64 {
    (value / cap * 10.0).max(0.0)
}
