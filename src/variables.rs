//! Upstream variable names
//!
//! These are the exact hourly variable names used by the marine and weather
//! APIs. They double as column headers in exports and as feature names for scoring.

pub const SWELL_WAVE_HEIGHT: &str = "swell_wave_height";
pub const SWELL_WAVE_PERIOD: &str = "swell_wave_period";
pub const SWELL_WAVE_DIRECTION: &str = "swell_wave_direction";
pub const WAVE_HEIGHT: &str = "wave_height";
pub const WAVE_PERIOD: &str = "wave_period";
pub const WAVE_DIRECTION: &str = "wave_direction";
pub const WIND_WAVE_HEIGHT: &str = "wind_wave_height";
pub const WIND_WAVE_PERIOD: &str = "wind_wave_period";
pub const WIND_WAVE_DIRECTION: &str = "wind_wave_direction";

pub const WIND_SPEED_10M: &str = "wind_speed_10m";
pub const WIND_DIRECTION_10M: &str = "wind_direction_10m";

pub const SEA_LEVEL_HEIGHT_MSL: &str = "sea_level_height_msl";

/// Derived column written by the reconciler
pub const WAVE_QUALITY_SCORE: &str = "wave_quality_score";

pub const MARINE_VARIABLES: [&str; 9] = [
    SWELL_WAVE_HEIGHT,
    SWELL_WAVE_PERIOD,
    SWELL_WAVE_DIRECTION,
    WAVE_HEIGHT,
    WAVE_PERIOD,
    WAVE_DIRECTION,
    WIND_WAVE_HEIGHT,
    WIND_WAVE_PERIOD,
    WIND_WAVE_DIRECTION,
];

pub const WIND_VARIABLES: [&str; 2] = [WIND_SPEED_10M, WIND_DIRECTION_10M];

pub const TIDE_VARIABLES: [&str; 1] = [SEA_LEVEL_HEIGHT_MSL];
