//! CSV export of merged forecasts
//!
//! Columns: `time` (RFC 3339 with offset), every variable in table order, then
//! `wave_quality_score`. Absent readings are written as empty cells.

use crate::Result;
use crate::models::MergedForecast;
use crate::variables::WAVE_QUALITY_SCORE;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn write_csv<W: Write>(writer: W, forecast: &MergedForecast) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(forecast.variables().len() + 2);
    header.push("time");
    header.extend(forecast.variables().iter().map(String::as_str));
    header.push(WAVE_QUALITY_SCORE);
    csv.write_record(&header)?;

    for row in forecast.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.timestamp.to_rfc3339());
        for variable in forecast.variables() {
            record.push(cell(row.value(variable)));
        }
        record.push(cell(row.wave_quality_score));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Write `forecast` to `path`, replacing any existing file
pub fn write_csv_file(path: &Path, forecast: &MergedForecast) -> Result<()> {
    let file = File::create(path)?;
    write_csv(file, forecast)?;
    info!("Wrote {} rows to {}", forecast.len(), path.display());
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
