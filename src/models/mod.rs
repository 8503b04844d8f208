//! Data models for the forecast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and the resolved place name
//! - Series: hourly samples and per-source time series tables
//! - Forecast: merged, scored forecasts handed to consumers

pub mod forecast;
pub mod location;
pub mod series;

// Re-export all public types for convenient access
pub use forecast::{ForecastRow, JoinKind, MergedForecast, SurfForecast};
pub use location::{Coordinate, Location};
pub use series::{Features, HourlySample, TimeSeriesTable, clean_reading};
