//! Configuration management for the swellcast pipeline
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::ForecastError;
use crate::models::JoinKind;
use crate::scoring::FeatureSet;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwellcastConfig {
    /// Upstream endpoint URLs
    pub endpoints: EndpointConfig,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Forecast defaults
    pub forecast: ForecastConfig,
    /// Quality scorer selection
    pub scoring: ScoringConfig,
    /// Historical backfill settings
    pub collection: CollectionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Upstream endpoint URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub geocoding_url: String,
    /// Marine API (swell and sea level) for upcoming dates
    pub marine_url: String,
    /// Marine API for past dates; the public service answers both on one URL
    pub marine_archive_url: String,
    /// Weather forecast API (wind)
    pub forecast_url: String,
    /// Historical weather API (wind)
    pub archive_url: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Courtesy throttle across all upstream calls
    pub max_requests_per_minute: u32,
    pub user_agent: String,
}

/// Forecast defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of days starting today
    pub days: u32,
    /// Join used for display forecasts
    pub join: JoinKind,
}

/// Which scorer the facade builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Heuristic,
    Model,
}

/// Quality scorer selection and model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub mode: ScoringMode,
    /// Feature order the model was trained on
    pub feature_set: FeatureSet,
    /// Directory holding the model artifacts
    pub model_dir: String,
    pub model_file: String,
    pub scaler_x_file: String,
    pub scaler_y_file: String,
}

/// Historical backfill settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Minimum delay between consecutive per-day fetches, in milliseconds
    pub pacing_ms: u64,
    /// Default export path
    pub output_path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            marine_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            marine_archive_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_requests_per_minute: 60,
            user_agent: format!("swellcast/{}", crate::VERSION),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: 7,
            join: JoinKind::Outer,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Heuristic,
            feature_set: FeatureSet::Swell,
            model_dir: "models".to_string(),
            model_file: "model.json".to_string(),
            scaler_x_file: "scaler_x.json".to_string(),
            scaler_y_file: "scaler_y.json".to_string(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1000,
            output_path: "historical_surf_data.csv".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ScoringConfig {
    /// Full paths of the three model artifacts
    #[must_use]
    pub fn artifact_paths(&self) -> (PathBuf, PathBuf, PathBuf) {
        let dir = PathBuf::from(&self.model_dir);
        (
            dir.join(&self.model_file),
            dir.join(&self.scaler_x_file),
            dir.join(&self.scaler_y_file),
        )
    }
}

impl SwellcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. SWELLCAST_SCORING__MODE=model
        builder = builder.add_source(
            Environment::with_prefix("SWELLCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SwellcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("swellcast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(ForecastError::config("HTTP timeout must be between 1 and 300 seconds").into());
        }

        if self.http.max_requests_per_minute == 0 || self.http.max_requests_per_minute > 600 {
            return Err(ForecastError::config(
                "max_requests_per_minute must be between 1 and 600",
            )
            .into());
        }

        if self.forecast.days == 0 || self.forecast.days > 16 {
            return Err(ForecastError::config("Forecast days must be between 1 and 16").into());
        }

        if self.collection.pacing_ms > 60_000 {
            return Err(ForecastError::config("Collection pacing cannot exceed 60000 ms").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("geocoding_url", &self.endpoints.geocoding_url),
            ("marine_url", &self.endpoints.marine_url),
            ("marine_archive_url", &self.endpoints.marine_archive_url),
            ("forecast_url", &self.endpoints.forecast_url),
            ("archive_url", &self.endpoints.archive_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ForecastError::config(format!(
                    "Endpoint {name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.scoring.mode == ScoringMode::Model && self.scoring.model_dir.trim().is_empty() {
            return Err(ForecastError::config("scoring.model_dir is required in model mode").into());
        }

        Ok(())
    }
}
