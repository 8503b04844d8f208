//! Merged forecast model
//!
//! Row mutation is crate-private: only the reconciler adds, drops or scores rows.

use super::{Features, Location};
use crate::reconcile::TideExtrema;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// How timestamps from several sources are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Keep only hours present in every source
    Inner,
    /// Keep every hour, leaving gaps where a source has no row
    #[default]
    Outer,
}

/// One merged hour
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastRow {
    pub timestamp: DateTime<FixedOffset>,
    pub values: Features,
    /// Derived score in [1, 10]; absent until scored or when features are missing
    pub wave_quality_score: Option<f64>,
}

impl ForecastRow {
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }

    /// Names from `required` this row has no reading for
    #[must_use]
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.value(name).is_none())
            .collect()
    }
}

/// Time-aligned table holding every variable from every source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MergedForecast {
    pub join: JoinKind,
    variables: Vec<String>,
    rows: Vec<ForecastRow>,
}

impl MergedForecast {
    pub(crate) fn new(join: JoinKind, variables: Vec<String>, rows: Vec<ForecastRow>) -> Self {
        Self {
            join,
            variables,
            rows,
        }
    }

    #[must_use]
    pub fn empty(join: JoinKind) -> Self {
        Self::new(join, Vec::new(), Vec::new())
    }

    /// Column names in source order (excluding the derived score)
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[must_use]
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows lacking at least one of `required`
    #[must_use]
    pub fn incomplete_rows(&self, required: &[&str]) -> Vec<&ForecastRow> {
        self.rows
            .iter()
            .filter(|row| !row.missing(required).is_empty())
            .collect()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<String>, &mut Vec<ForecastRow>) {
        (&mut self.variables, &mut self.rows)
    }
}

/// Facade output: a scored forecast for a named beach
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SurfForecast {
    pub location: Location,
    pub forecast: MergedForecast,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tides: Option<TideExtrema>,
    /// When this forecast was retrieved
    pub retrieved_at: DateTime<Utc>,
}
