//! End-to-end pipeline tests against an in-memory transport

mod common;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use common::*;
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use swellcast::config::ScoringMode;
use swellcast::export::write_csv_file;
use swellcast::scoring::ModelScorer;
use swellcast::{
    Clock, Coordinate, DateWindow, FeatureSet, FixedClock, ForecastError, ForecastOptions,
    ForecastService, HistoricalCollector, JoinKind, Predictor, QualityScorer, SwellcastConfig,
};

/// 2024-06-01 05:00 at Laguna Beach
fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()))
}

fn pdt(day: u32, hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(PDT_OFFSET)
        .unwrap()
        .with_ymd_and_hms(2024, 6, day, hour, 0, 0)
        .unwrap()
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn options(join: JoinKind, include_tides: bool) -> ForecastOptions {
    ForecastOptions {
        days: 1,
        join,
        include_tides,
    }
}

struct Constant(f64);

impl Predictor for Constant {
    fn predict(&self, _features: &[f64]) -> swellcast::Result<f64> {
        Ok(self.0)
    }
}

#[test]
fn test_laguna_beach_inner_join() {
    let transport = MockTransport::new(laguna_router);
    let service = ForecastService::new(&test_config(), transport.clone(), clock());

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Inner, false))
        .unwrap();

    assert_eq!(forecast.location.name, "Laguna Beach");
    assert_eq!(forecast.location.coordinate, Coordinate::new(33.54, -117.78));
    assert_eq!(forecast.forecast.len(), 22);
    assert_eq!(forecast.forecast.rows()[0].timestamp, pdt(1, 0));
    assert!(forecast.tides.is_none());

    // h = 5, p = 8, w = 3.33
    for row in forecast.forecast.rows() {
        let score = row.wave_quality_score.unwrap();
        assert!((score - 5.3667).abs() < 1e-3, "unexpected score {score}");
    }

    assert_eq!(transport.urls_to(GEO).len(), 1);
    assert_eq!(transport.urls_to(MARINE).len(), 1);
    assert_eq!(transport.urls_to(FORECAST).len(), 1);
    assert!(transport.urls_to(ARCHIVE).is_empty());
    assert!(transport.urls_to(MARINE_ARCHIVE).is_empty());
}

#[test]
fn test_laguna_beach_outer_join_keeps_gaps() {
    let service = ForecastService::new(&test_config(), MockTransport::new(laguna_router), clock());

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Outer, false))
        .unwrap();
    let rows = forecast.forecast.rows();

    assert_eq!(rows.len(), 24);
    assert_eq!(rows[21].value("wind_speed_10m"), Some(10.0));
    assert!(rows[21].wave_quality_score.is_some());
    for row in &rows[22..] {
        assert_eq!(row.value("wind_speed_10m"), None);
        assert_eq!(row.values.get("wind_speed_10m"), Some(&None));
        assert_eq!(row.wave_quality_score, None);
    }
    assert_eq!(forecast.forecast.incomplete_rows(&["wind_speed_10m"]).len(), 2);
}

#[test]
fn test_unknown_location_is_not_found() {
    let transport = MockTransport::new(|url| {
        assert!(url.starts_with(GEO));
        Ok(json!({"generationtime_ms": 0.5}))
    });
    let service = ForecastService::new(&test_config(), transport.clone(), clock());

    let err = service
        .forecast("Nowhere Point", &ForecastOptions::default())
        .unwrap_err();
    assert!(matches!(err, ForecastError::NotFound { .. }));
    assert!(err.user_message().contains("Nowhere Point"));
    assert_eq!(transport.urls().len(), 1);
}

#[test]
fn test_missing_model_artifacts_fail_before_any_request() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = test_config();
    config.scoring.mode = ScoringMode::Model;
    config.scoring.model_dir = dir.path().display().to_string();

    let transport = MockTransport::new(laguna_router);
    let service = ForecastService::new(&config, transport.clone(), clock());

    let err = service
        .forecast("Laguna Beach", &ForecastOptions::default())
        .unwrap_err();
    assert!(matches!(err, ForecastError::Configuration { .. }));
    assert!(transport.urls().is_empty());
}

#[test]
fn test_model_backed_forecast_from_artifacts() {
    let dir = tempfile::TempDir::new().unwrap();
    let write = |name: &str, value: Value| fs::write(dir.path().join(name), value.to_string()).unwrap();
    // Passes swell height straight through
    write(
        "model.json",
        json!({
            "feature_names": ["swell_wave_height", "swell_wave_period", "wind_speed_10m"],
            "layers": [{"weights": [[1.0, 0.0, 0.0]], "biases": [0.0], "activation": "linear"}]
        }),
    );
    write("scaler_x.json", json!({"mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0]}));
    write("scaler_y.json", json!({"mean": [0.0], "scale": [1.0]}));

    let mut config = test_config();
    config.scoring.mode = ScoringMode::Model;
    config.scoring.model_dir = dir.path().display().to_string();
    let service = ForecastService::new(&config, MockTransport::new(laguna_router), clock());

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Inner, false))
        .unwrap();
    assert!(matches!(service.scorer().unwrap(), QualityScorer::Model(_)));
    assert!(
        forecast
            .forecast
            .rows()
            .iter()
            .all(|row| row.wave_quality_score == Some(1.5))
    );
}

#[test]
fn test_tide_aware_model_requests_sea_level() {
    let transport = MockTransport::new(laguna_router);
    let scorer = QualityScorer::Model(ModelScorer::new(FeatureSet::SwellWithTide, Arc::new(Constant(7.0))));
    let service = ForecastService::new(&test_config(), transport.clone(), clock()).with_scorer(scorer);

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Inner, false))
        .unwrap();

    let marine_url = &transport.urls_to(MARINE)[0];
    assert!(requested_variables(marine_url).contains(&"sea_level_height_msl".to_string()));
    assert!(
        forecast
            .forecast
            .rows()
            .iter()
            .all(|row| row.wave_quality_score == Some(7.0))
    );
}

#[test]
fn test_no_data_from_any_source() {
    let service = ForecastService::new(
        &test_config(),
        MockTransport::new(|url| {
            if url.starts_with(GEO) {
                Ok(laguna_geocode())
            } else {
                Err(ForecastError::upstream("503 Service Unavailable"))
            }
        }),
        clock(),
    );

    let err = service
        .forecast("Laguna Beach", &ForecastOptions::default())
        .unwrap_err();
    assert!(matches!(err, ForecastError::UpstreamUnavailable { .. }));
    assert!(err.is_no_data());
}

#[test]
fn test_malformed_marine_response_degrades_to_wind_only() {
    let service = ForecastService::new(
        &test_config(),
        MockTransport::new(|url| {
            if url.starts_with(MARINE) {
                Ok(json!({"utc_offset_seconds": PDT_OFFSET}))
            } else {
                laguna_router(url)
            }
        }),
        clock(),
    );

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Outer, false))
        .unwrap();
    assert_eq!(forecast.forecast.len(), 22);
    assert!(forecast.forecast.rows().iter().all(|r| r.wave_quality_score.is_none()));
}

#[test]
fn test_inner_join_with_one_source_missing_is_no_data() {
    let transport = MockTransport::new(|url| {
        if url.starts_with(MARINE) {
            Ok(json!({"utc_offset_seconds": PDT_OFFSET}))
        } else {
            laguna_router(url)
        }
    });
    let service = ForecastService::new(&test_config(), transport.clone(), clock());

    let err = service
        .forecast("Laguna Beach", &options(JoinKind::Inner, false))
        .unwrap_err();
    assert!(matches!(err, ForecastError::UpstreamUnavailable { .. }));
    assert!(err.is_no_data());
    assert_eq!(transport.urls_to(FORECAST).len(), 1);
}

#[test]
fn test_forecast_with_tides() {
    let transport = MockTransport::new(laguna_router);
    let service = ForecastService::new(&test_config(), transport.clone(), clock());

    let forecast = service
        .forecast("Laguna Beach", &options(JoinKind::Outer, true))
        .unwrap();

    // One geocode serves both the forecast and the tides
    assert_eq!(transport.urls_to(GEO).len(), 1);
    let tides = forecast.tides.unwrap();
    let high = tides.next_high_tide.unwrap();
    assert_eq!(high.time, pdt(1, 6));
    assert_eq!(high.height_m, 3.0);
    assert_eq!(tides.next_low_tide.unwrap().time, pdt(1, 8));
}

#[test]
fn test_tides_across_today_use_both_endpoints() {
    let transport = MockTransport::new(laguna_router);
    let service = ForecastService::new(&test_config(), transport.clone(), clock());

    let window = DateWindow::new(date(5, 31), date(6, 1)).unwrap();
    let tides = service
        .tides(Coordinate::new(33.54, -117.78), window)
        .unwrap();

    let archive = transport.urls_to(MARINE_ARCHIVE);
    let forecast = transport.urls_to(MARINE);
    assert_eq!(archive.len(), 1);
    assert_eq!(forecast.len(), 1);
    assert_eq!(query_param(&archive[0], "start_date").as_deref(), Some("2024-05-31"));
    assert_eq!(query_param(&archive[0], "end_date").as_deref(), Some("2024-05-31"));
    assert_eq!(query_param(&forecast[0], "start_date").as_deref(), Some("2024-06-01"));
    assert_eq!(query_param(&forecast[0], "end_date").as_deref(), Some("2024-06-01"));
    assert_eq!(requested_variables(&forecast[0]), vec!["sea_level_height_msl"]);

    assert_eq!(tides.next_high_tide.unwrap().time, pdt(1, 6));
    assert_eq!(tides.next_low_tide.unwrap().time, pdt(1, 8));
}

#[test]
fn test_sentinel_sea_level_yields_no_tides() {
    let transport = MockTransport::new(|url| {
        let day = query_param(url, "start_date").unwrap();
        Ok(hourly_body(&day, 24, &requested_variables(url), |_, _| json!(-999.0)))
    });
    let service = ForecastService::new(&test_config(), transport, clock());

    let tides = service
        .tides(Coordinate::new(33.54, -117.78), DateWindow::single_day(date(6, 1)))
        .unwrap();
    assert!(tides.is_empty());
    assert_eq!(serde_json::to_string(&tides).unwrap(), "{}");
}

#[test]
fn test_tides_for_unknown_location() {
    let service = ForecastService::new(
        &test_config(),
        MockTransport::new(|_| Ok(json!({"results": []}))),
        clock(),
    );
    assert!(matches!(
        service.tides_for("Atlantis", 2),
        Err(ForecastError::NotFound { .. })
    ));
}

#[test]
fn test_historical_collection_to_csv() {
    let transport = MockTransport::new(|url| {
        let day = query_param(url, "start_date").unwrap_or_default();
        if url.starts_with(ARCHIVE) && day == "2024-05-30" {
            // One calm-wind reading missing on the second day
            return Ok(hourly_body(&day, 22, &requested_variables(url), |variable, hour| {
                if variable == "wind_speed_10m" && hour == 5 {
                    Value::Null
                } else {
                    surf_reading(variable, hour)
                }
            }));
        }
        laguna_router(url)
    });
    // The collector labels with the heuristic even when the service uses a model
    let scorer = QualityScorer::Model(ModelScorer::new(FeatureSet::Swell, Arc::new(Constant(9.0))));
    let service = ForecastService::new(&test_config(), transport.clone(), clock()).with_scorer(scorer);
    let collector = HistoricalCollector::new(&service, Duration::ZERO);

    let window = DateWindow::new(date(5, 29), date(5, 30)).unwrap();
    let (location, data, report) = collector.collect("Laguna Beach", window).unwrap();

    assert_eq!(location.name, "Laguna Beach");
    assert_eq!(report.days_requested, 2);
    assert_eq!(report.days_collected, 2);
    assert_eq!(report.rows_dropped, 1);
    assert_eq!(report.rows, 43);
    assert_eq!(data.len(), 43);
    assert!(data.rows().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert!(
        data.rows()
            .iter()
            .all(|row| (row.wave_quality_score.unwrap() - 5.3667).abs() < 1e-3)
    );

    assert_eq!(transport.urls_to(MARINE_ARCHIVE).len(), 2);
    assert_eq!(transport.urls_to(ARCHIVE).len(), 2);
    assert!(transport.urls_to(MARINE).is_empty());
    assert!(transport.urls_to(FORECAST).is_empty());

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("historical_surf_data.csv");
    write_csv_file(&path, &data).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 13);
    assert_eq!(&headers[0], "time");
    assert_eq!(&headers[1], "swell_wave_height");
    assert_eq!(&headers[12], "wave_quality_score");

    let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 43);
    assert_eq!(&records[0][0], "2024-05-29T00:00:00-07:00");
}

#[test]
fn test_collection_with_no_data_fails() {
    let service = ForecastService::new(
        &test_config(),
        MockTransport::new(|url| {
            if url.starts_with(GEO) {
                Ok(laguna_geocode())
            } else {
                Err(ForecastError::upstream("timeout"))
            }
        }),
        clock(),
    );
    let collector = HistoricalCollector::new(&service, Duration::ZERO);
    let window = DateWindow::single_day(date(5, 29));
    assert!(matches!(
        collector.collect("Laguna Beach", window),
        Err(ForecastError::UpstreamUnavailable { .. })
    ));
}

#[test]
fn test_default_config_is_valid_for_service() {
    let config = SwellcastConfig::default();
    assert!(ForecastService::from_config(&config).is_ok());
}
