//! Location name resolution
//!
//! Resolves a free-text beach or place name to coordinates through the
//! Open-Meteo geocoding API. Every call queries upstream anew.

use crate::api::{HttpTransport, with_query};
use crate::models::Coordinate;
use crate::{ForecastError, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country: Option<String>,
}

pub struct Geocoder {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl Geocoder {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Resolve `name` to the single best-matching coordinate.
    ///
    /// An empty result set, a network failure and an undecodable body all yield
    /// [`ForecastError::NotFound`]; the underlying cause is logged.
    #[instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<Coordinate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ForecastError::validation("Location cannot be empty"));
        }

        let url = with_query(
            &self.base_url,
            &[
                ("name", name.to_string()),
                ("count", "1".to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ],
        );

        let body = match self.transport.get_json(&url) {
            Ok(body) => body,
            Err(e) => {
                warn!("Geocoding request for '{}' failed: {}", name, e);
                return Err(ForecastError::not_found(name));
            }
        };

        let response: GeocodingResponse = match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to parse geocoding response for '{}': {}", name, e);
                return Err(ForecastError::not_found(name));
            }
        };

        let Some(best) = response.results.unwrap_or_default().into_iter().next() else {
            warn!("No results found for location '{}'", name);
            return Err(ForecastError::not_found(name));
        };

        debug!(
            "Best match: {} ({})",
            best.name.as_deref().unwrap_or(name),
            best.country.as_deref().unwrap_or("Unknown")
        );

        let coordinate = Coordinate::try_new(best.latitude, best.longitude).map_err(|e| {
            warn!("Geocoder returned unusable coordinates for '{}': {}", name, e);
            ForecastError::not_found(name)
        })?;

        info!(
            "Resolved '{}' to ({})",
            name,
            coordinate.format_coordinates()
        );
        Ok(coordinate)
    }
}
