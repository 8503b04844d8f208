//! Hourly time series model
//!
//! A [`TimeSeriesTable`] is the immutable snapshot a source fetcher hands to the
//! reconciler: hour-aligned samples in strictly increasing timestamp order, each
//! carrying a reading (or an explicit absence) for every declared variable.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Sentinel some upstream feeds use for "no reading"
pub const MISSING_SENTINEL: f64 = -999.0;

/// Variable name to reading; `None` marks an absent reading
pub type Features = BTreeMap<String, Option<f64>>;

/// Normalize a raw reading: sentinel, NaN and infinite values become absent.
#[must_use]
pub fn clean_reading(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && (v - MISSING_SENTINEL).abs() > 1e-9)
}

/// One hour of readings from a single source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlySample {
    pub timestamp: DateTime<FixedOffset>,
    pub values: Features,
}

impl HourlySample {
    #[must_use]
    pub fn new(timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            timestamp,
            values: Features::new(),
        }
    }

    /// Add a reading, cleaning sentinels on the way in
    #[must_use]
    pub fn with_value(mut self, name: &str, value: Option<f64>) -> Self {
        self.values.insert(name.to_string(), clean_reading(value));
        self
    }

    /// Defined reading for `name`, if any
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }
}

/// Ordered hourly table produced by one fetch
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    variables: Vec<String>,
    samples: Vec<HourlySample>,
}

impl TimeSeriesTable {
    /// A table with declared columns and no rows
    #[must_use]
    pub fn empty(variables: Vec<String>) -> Self {
        Self {
            variables,
            samples: Vec::new(),
        }
    }

    /// Build a table, enforcing the ordering invariant.
    ///
    /// Samples are stably sorted by timestamp; for duplicate timestamps the first
    /// occurrence is kept. Every sample gets an entry for every declared variable.
    #[must_use]
    pub fn from_samples(variables: Vec<String>, mut samples: Vec<HourlySample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);

        let before = samples.len();
        samples.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        if samples.len() < before {
            warn!(
                "Dropped {} duplicate timestamp(s) while building time series",
                before - samples.len()
            );
        }

        for sample in &mut samples {
            for variable in &variables {
                let slot = sample.values.entry(variable.clone()).or_insert(None);
                *slot = clean_reading(*slot);
            }
        }

        Self { variables, samples }
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[must_use]
    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<FixedOffset>> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    /// A single column as `(timestamp, reading)` pairs
    #[must_use]
    pub fn series(&self, variable: &str) -> Vec<(DateTime<FixedOffset>, Option<f64>)> {
        self.samples
            .iter()
            .map(|s| (s.timestamp, s.value(variable)))
            .collect()
    }

    /// Concatenate two snapshots of the same source (e.g. archive + forecast halves)
    #[must_use]
    pub fn concat(self, other: TimeSeriesTable) -> Self {
        let mut variables = self.variables;
        for variable in other.variables {
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        let mut samples = self.samples;
        samples.extend(other.samples);
        Self::from_samples(variables, samples)
    }
}
