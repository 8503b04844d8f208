//! Time-alignment and scoring of per-source tables
//!
//! The reconciler is the only code that mutates a [`MergedForecast`]. Joins are
//! exact timestamp sort-merges; nothing is interpolated or zero-filled.

pub mod tides;

pub use tides::{TideExtrema, TideExtremum, TideKind, local_extrema, next_extrema, tide_extrema};

use crate::models::{Features, ForecastRow, HourlySample, JoinKind, MergedForecast, TimeSeriesTable};
use crate::scoring::QualityScorer;
use crate::{ForecastError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Outcome of a scoring pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub scored: usize,
    /// Rows left unscored because a required feature was absent
    pub skipped: usize,
}

/// Align `tables` on their timestamps.
///
/// Columns appear in table order. When two tables share a column, the first
/// defined reading wins.
#[must_use]
pub fn merge(tables: &[TimeSeriesTable], join: JoinKind) -> MergedForecast {
    let mut variables: Vec<String> = Vec::new();
    for table in tables {
        for variable in table.variables() {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
    }

    let mut tables = tables.iter();
    let mut rows: Vec<ForecastRow> = match tables.next() {
        Some(first) => first.samples().iter().map(row_from_sample).collect(),
        None => Vec::new(),
    };
    for table in tables {
        rows = merge_pair(rows, table.samples(), join);
    }
    fill_columns(&mut rows, &variables);

    debug!("Merged into {} rows ({:?} join)", rows.len(), join);
    MergedForecast::new(join, variables, rows)
}

fn row_from_sample(sample: &HourlySample) -> ForecastRow {
    ForecastRow {
        timestamp: sample.timestamp,
        values: sample.values.clone(),
        wave_quality_score: None,
    }
}

fn merge_pair(left: Vec<ForecastRow>, right: &[HourlySample], join: JoinKind) -> Vec<ForecastRow> {
    let keep_unmatched = join == JoinKind::Outer;
    let mut merged = Vec::with_capacity(left.len().max(right.len()));
    let mut left = left.into_iter().peekable();
    let mut right = right.iter().peekable();

    loop {
        let ordering = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.timestamp.cmp(&r.timestamp),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        match ordering {
            Ordering::Less => {
                let row = left.next();
                if keep_unmatched {
                    merged.extend(row);
                }
            }
            Ordering::Greater => {
                let sample = right.next();
                if keep_unmatched {
                    merged.extend(sample.map(row_from_sample));
                }
            }
            Ordering::Equal => {
                if let (Some(mut row), Some(sample)) = (left.next(), right.next()) {
                    absorb(&mut row.values, &sample.values);
                    merged.push(row);
                }
            }
        }
    }

    merged
}

/// Copy readings from `other` into slots `values` has no defined reading for
fn absorb(values: &mut Features, other: &Features) {
    for (name, reading) in other {
        let slot = values.entry(name.clone()).or_insert(None);
        if slot.is_none() {
            *slot = *reading;
        }
    }
}

fn fill_columns(rows: &mut [ForecastRow], variables: &[String]) {
    for row in rows {
        for variable in variables {
            row.values.entry(variable.clone()).or_insert(None);
        }
    }
}

/// Write `wave_quality_score` on every row.
///
/// A row missing a required feature keeps an absent score; any other scorer
/// error aborts the pass.
pub fn score(forecast: &mut MergedForecast, scorer: &QualityScorer) -> Result<ScoreSummary> {
    let mut summary = ScoreSummary::default();
    let (_, rows) = forecast.parts_mut();

    for row in rows.iter_mut() {
        match scorer.score(row) {
            Ok(value) => {
                row.wave_quality_score = Some(value);
                summary.scored += 1;
            }
            Err(ForecastError::MissingFeature { features }) => {
                debug!("Not scoring {}: missing {}", row.timestamp, features.join(", "));
                row.wave_quality_score = None;
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if summary.skipped > 0 {
        info!(
            "Scored {} rows, {} left unscored for missing features",
            summary.scored, summary.skipped
        );
    }
    Ok(summary)
}

/// Append `other` to `forecast`, keeping timestamps strictly increasing.
///
/// Where both hold the same hour, the row already in `forecast` is kept.
pub fn append(forecast: &mut MergedForecast, other: MergedForecast) {
    let (variables, rows) = forecast.parts_mut();
    for variable in other.variables() {
        if !variables.contains(variable) {
            variables.push(variable.clone());
        }
    }

    rows.extend(other.rows().iter().cloned());
    rows.sort_by_key(|row| row.timestamp);
    rows.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
    fill_columns(rows, variables);
}

/// Remove rows lacking any of `required`; returns how many were dropped
pub fn drop_incomplete(forecast: &mut MergedForecast, required: &[&str]) -> usize {
    let (_, rows) = forecast.parts_mut();
    let before = rows.len();
    rows.retain(|row| row.missing(required).is_empty());
    let dropped = before - rows.len();
    if dropped > 0 {
        debug!("Dropped {} incomplete rows", dropped);
    }
    dropped
}
