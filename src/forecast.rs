//! Surf forecast service
//!
//! [`ForecastService`] is the entry point for dashboards and batch jobs: it resolves
//! a beach name, fetches marine and wind data, merges and scores them, and
//! optionally derives the next tides. The quality scorer is built once, on first
//! use, and shared by every later call.

use crate::api::HttpTransport;
use crate::clock::Clock;
use crate::config::{ForecastConfig, ScoringConfig, SwellcastConfig};
use crate::geocoder::Geocoder;
use crate::models::{Coordinate, JoinKind, Location, SurfForecast};
use crate::reconcile::{self, TideExtrema};
use crate::scoring::QualityScorer;
use crate::sources::{DateWindow, SourceFetcher, SourceKind};
use crate::variables::{MARINE_VARIABLES, SEA_LEVEL_HEIGHT_MSL, TIDE_VARIABLES, WIND_VARIABLES};
use crate::{ForecastError, Result};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument, warn};

/// Per-call forecast options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastOptions {
    /// Days starting today
    pub days: u32,
    pub join: JoinKind,
    /// Also derive the next high and low tide
    pub include_tides: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl ForecastOptions {
    #[must_use]
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            days: config.days,
            join: config.join,
            include_tides: false,
        }
    }
}

pub struct ForecastService {
    scoring: ScoringConfig,
    scorer: OnceLock<QualityScorer>,
    geocoder: Geocoder,
    marine: SourceFetcher,
    wind: SourceFetcher,
    tide: SourceFetcher,
    clock: Arc<dyn Clock>,
}

impl ForecastService {
    pub fn new(config: &SwellcastConfig, transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>) -> Self {
        let endpoints = &config.endpoints;
        Self {
            scoring: config.scoring.clone(),
            scorer: OnceLock::new(),
            geocoder: Geocoder::new(transport.clone(), endpoints.geocoding_url.clone()),
            marine: SourceFetcher::from_config(SourceKind::Marine, endpoints, transport.clone()),
            wind: SourceFetcher::from_config(SourceKind::Wind, endpoints, transport.clone()),
            tide: SourceFetcher::from_config(SourceKind::Tide, endpoints, transport),
            clock,
        }
    }

    /// Service backed by the real network and wall clock
    pub fn from_config(config: &SwellcastConfig) -> Result<Self> {
        let transport = crate::api::ReqwestTransport::new(&config.http)?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(crate::clock::SystemClock),
        ))
    }

    /// Use `scorer` instead of building one from configuration
    #[must_use]
    pub fn with_scorer(self, scorer: QualityScorer) -> Self {
        Self {
            scorer: OnceLock::from(scorer),
            ..self
        }
    }

    /// The shared scorer, built from configuration on first call
    pub fn scorer(&self) -> Result<&QualityScorer> {
        if let Some(scorer) = self.scorer.get() {
            return Ok(scorer);
        }
        let built = QualityScorer::from_config(&self.scoring)?;
        // Another caller may have set it first; keep theirs
        let _ = self.scorer.set(built);
        self.scorer
            .get()
            .ok_or_else(|| ForecastError::config("quality scorer failed to initialize"))
    }

    pub fn resolve(&self, name: &str) -> Result<Location> {
        let coordinate = self.geocoder.resolve(name)?;
        Ok(Location::new(name.trim(), coordinate))
    }

    /// Scored forecast for `name` over `options.days` days from today.
    ///
    /// Returns [`ForecastError::UpstreamUnavailable`] when neither marine nor wind
    /// data could be fetched, or when the join leaves no hours at all.
    #[instrument(skip(self))]
    pub fn forecast(&self, name: &str, options: &ForecastOptions) -> Result<SurfForecast> {
        let scorer = self.scorer()?;
        let location = self.resolve(name)?;
        let window = DateWindow::starting_at(self.clock.today(), options.days)?;

        let mut marine_variables: Vec<&str> = MARINE_VARIABLES.to_vec();
        if options.include_tides || scorer.requires_sea_level() {
            marine_variables.push(SEA_LEVEL_HEIGHT_MSL);
        }

        let tables = [
            self.marine
                .fetch(location.coordinate, window, &marine_variables, self.clock.today())?,
            self.wind
                .fetch(location.coordinate, window, &WIND_VARIABLES, self.clock.today())?,
        ];
        if tables.iter().all(|t| t.is_empty()) {
            return Err(ForecastError::upstream(format!(
                "no marine or wind data for {}",
                location.name
            )));
        }
        for table in tables.iter().filter(|t| t.is_empty()) {
            warn!("Source returned no rows for {}: {:?}", location.name, table.variables());
        }

        let mut forecast = reconcile::merge(&tables, options.join);
        if forecast.is_empty() {
            return Err(ForecastError::upstream(format!(
                "no hours shared by marine and wind data for {} ({:?} join)",
                location.name, options.join
            )));
        }
        let summary = reconcile::score(&mut forecast, scorer)?;
        debug!("Scoring summary: {:?}", summary);

        let now = self.clock.now();
        let tides = options
            .include_tides
            .then(|| reconcile::tide_extrema(&tables[0], now));

        info!(
            "Forecast for {}: {} hourly rows, {} scored",
            location.name,
            forecast.len(),
            summary.scored
        );

        Ok(SurfForecast {
            location,
            forecast,
            tides,
            retrieved_at: now,
        })
    }

    /// Next high and low tide at `coordinate` within `window`
    #[instrument(skip(self))]
    pub fn tides(&self, coordinate: Coordinate, window: DateWindow) -> Result<TideExtrema> {
        let table = self
            .tide
            .fetch(coordinate, window, &TIDE_VARIABLES, self.clock.today())?;
        if table.is_empty() {
            warn!("No sea level data for {}", coordinate.format_coordinates());
        }
        Ok(reconcile::tide_extrema(&table, self.clock.now()))
    }

    /// Resolve `name` once, then look for tides over `days` days from today
    pub fn tides_for(&self, name: &str, days: u32) -> Result<(Location, TideExtrema)> {
        let location = self.resolve(name)?;
        let window = DateWindow::starting_at(self.clock.today(), days)?;
        let tides = self.tides(location.coordinate, window)?;
        Ok((location, tides))
    }

    pub(crate) fn marine_fetcher(&self) -> &SourceFetcher {
        &self.marine
    }

    pub(crate) fn wind_fetcher(&self) -> &SourceFetcher {
        &self.wind
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
