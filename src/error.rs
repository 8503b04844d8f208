//! Error types and handling for the swellcast forecast pipeline

use thiserror::Error;

/// Main error type for the forecast pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Geocoding yielded no usable result
    #[error("Location not found: {name}")]
    NotFound { name: String },

    /// Network or HTTP failure from an upstream service
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Upstream answered, but not with the expected shape
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Scorer invoked without its required inputs
    #[error("Missing required feature(s): {}", .features.join(", "))]
    MissingFeature { features: Vec<String> },

    /// Invalid or incomplete configuration (including absent model artifacts)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// CSV export errors
    #[error("Export error: {source}")]
    Export {
        #[from]
        source: csv::Error,
    },
}

impl ForecastError {
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a missing-feature error naming every absent feature
    pub fn missing_features<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFeature {
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether callers should treat this as "no data available" rather than a hard failure.
    ///
    /// Network failures and malformed payloads both degrade to empty data.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ForecastError::UpstreamUnavailable { .. } | ForecastError::MalformedResponse { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::NotFound { name } => {
                format!("Could not find a location named '{name}'. Please check the spelling.")
            }
            ForecastError::UpstreamUnavailable { .. } | ForecastError::MalformedResponse { .. } => {
                "Forecast unavailable. Please check your internet connection or try again later."
                    .to_string()
            }
            ForecastError::MissingFeature { features } => {
                format!("Cannot score this hour, missing: {}", features.join(", "))
            }
            ForecastError::Configuration { message } => {
                format!("Configuration error: {message}")
            }
            ForecastError::Validation { message } => format!("Invalid input: {message}"),
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            ForecastError::Export { .. } => "Failed to write the data export.".to_string(),
        }
    }
}
