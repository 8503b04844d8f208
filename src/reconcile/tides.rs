//! Tide extrema from hourly sea level
//!
//! A sample is a high (low) tide when it equals the maximum (minimum) of the
//! centered three-hour window around it. Only windows with three defined readings
//! exactly one hour apart are considered, so edge rows never qualify.

use crate::models::{TimeSeriesTable, clean_reading};
use crate::variables::SEA_LEVEL_HEIGHT_MSL;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideExtremum {
    pub time: DateTime<FixedOffset>,
    /// Sea level relative to mean sea level, in meters
    pub height_m: f64,
    pub kind: TideKind,
}

/// The next high and low tide; a member is omitted when none qualifies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TideExtrema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_high_tide: Option<TideExtremum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_low_tide: Option<TideExtremum>,
}

impl TideExtrema {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_high_tide.is_none() && self.next_low_tide.is_none()
    }
}

/// Every local extremum in `series`, in time order
#[must_use]
pub fn local_extrema(series: &[(DateTime<FixedOffset>, Option<f64>)]) -> Vec<TideExtremum> {
    let hour = TimeDelta::hours(1);
    let mut extrema = Vec::new();

    for window in series.windows(3) {
        let [(t0, v0), (t1, v1), (t2, v2)] = window else {
            continue;
        };
        let (Some(prev), Some(current), Some(next)) =
            (clean_reading(*v0), clean_reading(*v1), clean_reading(*v2))
        else {
            continue;
        };
        if *t1 - *t0 != hour || *t2 - *t1 != hour {
            continue;
        }

        if current == prev.max(current).max(next) {
            extrema.push(TideExtremum {
                time: *t1,
                height_m: current,
                kind: TideKind::High,
            });
        }
        if current == prev.min(current).min(next) {
            extrema.push(TideExtremum {
                time: *t1,
                height_m: current,
                kind: TideKind::Low,
            });
        }
    }

    extrema
}

/// The earliest high and earliest low strictly after `now`
#[must_use]
pub fn next_extrema(series: &[(DateTime<FixedOffset>, Option<f64>)], now: DateTime<Utc>) -> TideExtrema {
    let upcoming: Vec<_> = local_extrema(series)
        .into_iter()
        .filter(|e| e.time > now)
        .collect();

    let first_of = |kind: TideKind| upcoming.iter().find(|e| e.kind == kind).cloned();
    TideExtrema {
        next_high_tide: first_of(TideKind::High),
        next_low_tide: first_of(TideKind::Low),
    }
}

/// Next tides from the sea level column of `table`
#[must_use]
pub fn tide_extrema(table: &TimeSeriesTable, now: DateTime<Utc>) -> TideExtrema {
    next_extrema(&table.series(SEA_LEVEL_HEIGHT_MSL), now)
}
