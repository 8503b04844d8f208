//! Open-Meteo hourly request and response handling
//!
//! The marine, forecast and archive APIs share one response shape:
//! `{"utc_offset_seconds": i32, "hourly": {"time": [...], "<variable>": [...]}}`.

use super::DateWindow;
use crate::api::with_query;
use crate::models::{Coordinate, HourlySample, TimeSeriesTable};
use crate::{ForecastError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: Option<Map<String, Value>>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Build the GET URL for `variables` over `window`, in the location's local time
#[must_use]
pub fn request_url(
    base: &str,
    coordinate: Coordinate,
    window: DateWindow,
    variables: &[&str],
) -> String {
    with_query(
        base,
        &[
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("hourly", variables.join(",")),
            ("start_date", window.start().format("%Y-%m-%d").to_string()),
            ("end_date", window.end().format("%Y-%m-%d").to_string()),
            ("timezone", "auto".to_string()),
        ],
    )
}

/// Decode an hourly block into a table with one column per requested variable.
///
/// A missing `hourly` or `time` block, a missing variable, and a column whose length
/// differs from `time` are all [`ForecastError::MalformedResponse`].
pub fn parse_hourly(body: &Value, variables: &[&str]) -> Result<TimeSeriesTable> {
    let response = HourlyResponse::deserialize(body)
        .map_err(|e| ForecastError::malformed(format!("Unexpected response shape: {e}")))?;

    if response.error {
        return Err(ForecastError::malformed(
            response
                .reason
                .unwrap_or_else(|| "upstream reported an error".to_string()),
        ));
    }

    let hourly = response
        .hourly
        .ok_or_else(|| ForecastError::malformed("response has no hourly block"))?;
    let offset = FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| {
        ForecastError::malformed(format!(
            "invalid utc_offset_seconds {}",
            response.utc_offset_seconds
        ))
    })?;

    let times = hourly
        .get("time")
        .and_then(Value::as_array)
        .ok_or_else(|| ForecastError::malformed("hourly block has no time column"))?;
    let timestamps = times
        .iter()
        .map(|t| parse_time(t, offset))
        .collect::<Result<Vec<_>>>()?;

    let mut columns = Vec::with_capacity(variables.len());
    for variable in variables {
        let column = hourly
            .get(*variable)
            .and_then(Value::as_array)
            .ok_or_else(|| ForecastError::malformed(format!("hourly block has no {variable} column")))?;
        if column.len() != timestamps.len() {
            return Err(ForecastError::malformed(format!(
                "{variable} has {} values for {} timestamps",
                column.len(),
                timestamps.len()
            )));
        }
        columns.push((*variable, column));
    }

    let samples = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| {
            columns
                .iter()
                .fold(HourlySample::new(timestamp), |sample, (name, column)| {
                    sample.with_value(name, column[i].as_f64())
                })
        })
        .collect();

    Ok(TimeSeriesTable::from_samples(
        variables.iter().map(|v| (*v).to_string()).collect(),
        samples,
    ))
}

fn parse_time(value: &Value, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let text = value
        .as_str()
        .ok_or_else(|| ForecastError::malformed(format!("time entry {value} is not a string")))?;
    let naive = NaiveDateTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| ForecastError::malformed(format!("bad timestamp '{text}': {e}")))?;
    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ForecastError::malformed(format!("ambiguous timestamp '{text}'")))
}
