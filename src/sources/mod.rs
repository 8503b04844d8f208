//! Source fetchers
//!
//! One [`SourceFetcher`] per upstream data kind. Each kind has an endpoint pair:
//! an archive endpoint for past dates and a forecast endpoint for today onwards.
//! A date window that straddles today is split and fetched from both.

pub mod open_meteo;

use crate::api::HttpTransport;
use crate::config::EndpointConfig;
use crate::models::{Coordinate, TimeSeriesTable};
use crate::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Swell, wave and wind-wave readings
    Marine,
    /// Surface wind
    Wind,
    /// Sea level, for tide extrema
    Tide,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Marine => write!(f, "marine"),
            SourceKind::Wind => write!(f, "wind"),
            SourceKind::Tide => write!(f, "tide"),
        }
    }
}

/// Which half of the endpoint pair serves a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Historical,
    Forecast,
}

/// Dates before `today` are historical
#[must_use]
pub fn select_regime(start: NaiveDate, today: NaiveDate) -> Regime {
    if start < today {
        Regime::Historical
    } else {
        Regime::Forecast
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub forecast: String,
    pub archive: String,
}

impl Endpoints {
    /// The configured pair for `kind`; marine and tide share the marine API
    #[must_use]
    pub fn for_kind(kind: SourceKind, config: &EndpointConfig) -> Self {
        match kind {
            SourceKind::Marine | SourceKind::Tide => Self {
                forecast: config.marine_url.clone(),
                archive: config.marine_archive_url.clone(),
            },
            SourceKind::Wind => Self {
                forecast: config.forecast_url.clone(),
                archive: config.archive_url.clone(),
            },
        }
    }

    #[must_use]
    pub fn url(&self, regime: Regime) -> &str {
        match regime {
            Regime::Historical => &self.archive,
            Regime::Forecast => &self.forecast,
        }
    }
}

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ForecastError::validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// `days` consecutive dates beginning at `start`
    pub fn starting_at(start: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(ForecastError::validation("days must be at least 1"));
        }
        let end = start
            .checked_add_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| ForecastError::validation("date window out of range"))?;
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every date in the window, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }

    /// Split into the parts served by each endpoint.
    ///
    /// `[start, today - 1]` is historical and `[today, end]` is forecast; a window
    /// entirely on one side yields a single part.
    #[must_use]
    pub fn split_at_today(&self, today: NaiveDate) -> Vec<(Regime, DateWindow)> {
        if self.end < today {
            return vec![(Regime::Historical, *self)];
        }
        if self.start >= today {
            return vec![(Regime::Forecast, *self)];
        }
        // start < today <= end, so today has a predecessor inside the window
        let yesterday = today.pred_opt().unwrap_or(today);
        vec![
            (
                Regime::Historical,
                DateWindow {
                    start: self.start,
                    end: yesterday,
                },
            ),
            (
                Regime::Forecast,
                DateWindow {
                    start: today,
                    end: self.end,
                },
            ),
        ]
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Fetches one data kind from its endpoint pair
pub struct SourceFetcher {
    kind: SourceKind,
    endpoints: Endpoints,
    transport: Arc<dyn HttpTransport>,
}

impl SourceFetcher {
    pub fn new(kind: SourceKind, endpoints: Endpoints, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            kind,
            endpoints,
            transport,
        }
    }

    pub fn from_config(
        kind: SourceKind,
        config: &EndpointConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::new(kind, Endpoints::for_kind(kind, config), transport)
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Fetch `variables` over `window`, surfacing the cause of any failure.
    #[instrument(skip(self, variables, window), fields(kind = %self.kind, window = %window))]
    pub fn try_fetch(
        &self,
        coordinate: Coordinate,
        window: DateWindow,
        variables: &[&str],
        today: NaiveDate,
    ) -> Result<TimeSeriesTable> {
        if variables.is_empty() {
            return Err(ForecastError::validation("at least one variable is required"));
        }

        let mut table = TimeSeriesTable::empty(variables.iter().map(|v| (*v).to_string()).collect());
        for (regime, part) in window.split_at_today(today) {
            let base = self.endpoints.url(regime);
            let url = open_meteo::request_url(base, coordinate, part, variables);
            debug!("Fetching {:?} part {}", regime, part);

            let body = self.transport.get_json(&url)?;
            let part_table = open_meteo::parse_hourly(&body, variables)?;
            table = table.concat(part_table);
        }

        debug!("Fetched {} hourly rows", table.len());
        Ok(table)
    }

    /// Like [`Self::try_fetch`], but upstream failures degrade to an empty table.
    ///
    /// Invalid arguments are still reported as errors.
    pub fn fetch(
        &self,
        coordinate: Coordinate,
        window: DateWindow,
        variables: &[&str],
        today: NaiveDate,
    ) -> Result<TimeSeriesTable> {
        match self.try_fetch(coordinate, window, variables, today) {
            Ok(table) => Ok(table),
            Err(e) if e.is_no_data() => {
                warn!("{} fetch for {} returned no data: {}", self.kind, window, e);
                Ok(TimeSeriesTable::empty(
                    variables.iter().map(|v| (*v).to_string()).collect(),
                ))
            }
            Err(e) => Err(e),
        }
    }
}
