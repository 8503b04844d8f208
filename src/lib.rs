//! `swellcast` - surf forecasting from open marine and weather data
//!
//! This library resolves beach names to coordinates, fetches hourly marine, wind
//! and sea level data, aligns them on time, scores wave quality and finds the
//! next tides. [`ForecastService`] is the main entry point.

pub mod api;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod geocoder;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod scoring;
pub mod sources;
pub mod variables;

// Re-export core types for public API
pub use api::{HttpTransport, ReqwestTransport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collector::{CollectionReport, HistoricalCollector};
pub use config::SwellcastConfig;
pub use error::ForecastError;
pub use forecast::{ForecastOptions, ForecastService};
pub use geocoder::Geocoder;
pub use models::{Coordinate, JoinKind, Location, MergedForecast, SurfForecast, TimeSeriesTable};
pub use reconcile::{TideExtrema, TideExtremum, TideKind};
pub use scoring::{FeatureSet, Predictor, QualityScorer};
pub use sources::{DateWindow, SourceFetcher, SourceKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
