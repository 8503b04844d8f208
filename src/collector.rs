//! Historical training-data collection
//!
//! Walks a date range one day at a time, fetching archived marine and wind data,
//! inner-joining them and labelling each hour with the heuristic score. Requests
//! are paced by a fixed delay between days.

use crate::forecast::ForecastService;
use crate::models::{JoinKind, Location, MergedForecast};
use crate::reconcile;
use crate::scoring::QualityScorer;
use crate::sources::DateWindow;
use crate::variables::{MARINE_VARIABLES, WIND_VARIABLES};
use crate::{ForecastError, Result};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// What a collection run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub days_requested: usize,
    pub days_collected: usize,
    pub rows: usize,
    /// Rows discarded for missing readings
    pub rows_dropped: usize,
}

pub struct HistoricalCollector<'a> {
    service: &'a ForecastService,
    pacing: Duration,
    scorer: QualityScorer,
}

impl<'a> HistoricalCollector<'a> {
    /// Labels always come from the heuristic scorer, whatever the service uses.
    pub fn new(service: &'a ForecastService, pacing: Duration) -> Self {
        Self {
            service,
            pacing,
            scorer: QualityScorer::default(),
        }
    }

    /// Collect scored hours for `name` over `window`.
    ///
    /// Days where either source returns nothing are skipped. Fails with
    /// [`ForecastError::UpstreamUnavailable`] if no day produced any rows.
    #[instrument(skip(self, window), fields(window = %window))]
    pub fn collect(&self, name: &str, window: DateWindow) -> Result<(Location, MergedForecast, CollectionReport)> {
        let location = self.service.resolve(name)?;
        let today = self.service.clock().today();
        let required: Vec<&str> = MARINE_VARIABLES.iter().chain(&WIND_VARIABLES).copied().collect();

        let mut collected = MergedForecast::empty(JoinKind::Inner);
        let mut report = CollectionReport::default();

        for (index, day) in window.days().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                thread::sleep(self.pacing);
            }
            report.days_requested += 1;

            let day_window = DateWindow::single_day(day);
            let marine = self.service.marine_fetcher().fetch(
                location.coordinate,
                day_window,
                &MARINE_VARIABLES,
                today,
            )?;
            let wind = self.service.wind_fetcher().fetch(
                location.coordinate,
                day_window,
                &WIND_VARIABLES,
                today,
            )?;
            if marine.is_empty() || wind.is_empty() {
                warn!("Could not fetch data for {}, skipping", day);
                continue;
            }

            let mut merged = reconcile::merge(&[marine, wind], JoinKind::Inner);
            if merged.is_empty() {
                warn!("No matching hours for {}, skipping", day);
                continue;
            }
            reconcile::score(&mut merged, &self.scorer)?;
            report.rows_dropped += reconcile::drop_incomplete(&mut merged, &required);

            info!("Collected {} hours for {}", merged.len(), day);
            report.days_collected += 1;
            reconcile::append(&mut collected, merged);
        }

        report.rows = collected.len();
        if collected.is_empty() {
            return Err(ForecastError::upstream(format!(
                "no historical data collected for {} over {}",
                location.name, window
            )));
        }

        info!(
            "Collection complete: {} rows from {}/{} days",
            report.rows, report.days_collected, report.days_requested
        );
        Ok((location, collected, report))
    }
}
