//! Shared fixtures: an in-memory transport and Open-Meteo response builders

#![allow(dead_code)]

use chrono::{NaiveDate, TimeDelta};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use swellcast::config::EndpointConfig;
use swellcast::{ForecastError, HttpTransport, Result, SwellcastConfig};

pub const GEO: &str = "http://geo.test/v1/search";
pub const MARINE: &str = "http://marine.test/v1/marine";
pub const MARINE_ARCHIVE: &str = "http://marine-archive.test/v1/marine";
pub const FORECAST: &str = "http://forecast.test/v1/forecast";
pub const ARCHIVE: &str = "http://archive.test/v1/archive";

/// Laguna Beach reports in Pacific Daylight Time
pub const PDT_OFFSET: i32 = -25_200;

type Router = dyn Fn(&str) -> Result<Value> + Send + Sync;

/// Answers every GET through `router` and records the URLs asked for
pub struct MockTransport {
    router: Box<Router>,
    urls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(router: impl Fn(&str) -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            router: Box::new(router),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn urls_to(&self, base: &str) -> Vec<String> {
        self.urls()
            .into_iter()
            .filter(|url| url.starts_with(&format!("{base}?")))
            .collect()
    }
}

impl HttpTransport for MockTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.urls.lock().unwrap().push(url.to_string());
        (self.router)(url)
    }
}

/// Default configuration pointed at the mock endpoints, without pacing
pub fn test_config() -> SwellcastConfig {
    let mut config = SwellcastConfig::default();
    config.endpoints = EndpointConfig {
        geocoding_url: GEO.to_string(),
        marine_url: MARINE.to_string(),
        marine_archive_url: MARINE_ARCHIVE.to_string(),
        forecast_url: FORECAST.to_string(),
        archive_url: ARCHIVE.to_string(),
    };
    config.collection.pacing_ms = 0;
    config
}

/// Decoded value of query parameter `name`
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != name {
            return None;
        }
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}

/// Variables listed in the `hourly` parameter
pub fn requested_variables(url: &str) -> Vec<String> {
    query_param(url, "hourly")
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn laguna_geocode() -> Value {
    json!({
        "results": [{
            "id": 5364514,
            "name": "Laguna Beach",
            "latitude": 33.54,
            "longitude": -117.78,
            "country": "United States",
            "timezone": "America/Los_Angeles"
        }]
    })
}

/// An hourly response starting at midnight of `day`, local time
pub fn hourly_body(
    day: &str,
    hours: usize,
    variables: &[String],
    reading: impl Fn(&str, usize) -> Value,
) -> Value {
    let midnight = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let time: Vec<String> = (0..hours)
        .map(|h| {
            (midnight + TimeDelta::hours(h as i64))
                .format("%Y-%m-%dT%H:%M")
                .to_string()
        })
        .collect();

    let mut hourly = Map::new();
    hourly.insert("time".to_string(), json!(time));
    for variable in variables {
        let column: Vec<Value> = (0..hours).map(|h| reading(variable, h)).collect();
        hourly.insert(variable.clone(), Value::Array(column));
    }

    json!({
        "latitude": 33.5,
        "longitude": -117.75,
        "utc_offset_seconds": PDT_OFFSET,
        "timezone": "America/Los_Angeles",
        "hourly": Value::Object(hourly)
    })
}

/// Sea level rising and falling on a four-hour cycle: 1, 2, 3, 2, 1, ...
pub fn sea_level(hour: usize) -> f64 {
    [1.0, 2.0, 3.0, 2.0][hour % 4]
}

/// Plausible readings for every variable the pipeline asks for
pub fn surf_reading(variable: &str, hour: usize) -> Value {
    match variable {
        "swell_wave_height" => json!(1.5),
        "swell_wave_period" => json!(12.0),
        "wind_speed_10m" => json!(10.0),
        "wind_direction_10m" => json!(270.0),
        "sea_level_height_msl" => json!(sea_level(hour)),
        _ => json!(0.5),
    }
}

/// Laguna Beach: 24 marine hours and 22 wind hours per requested day
pub fn laguna_router(url: &str) -> Result<Value> {
    if url.starts_with(GEO) {
        return Ok(laguna_geocode());
    }
    let day = query_param(url, "start_date")
        .ok_or_else(|| ForecastError::upstream("missing start_date"))?;
    let variables = requested_variables(url);

    if url.starts_with(MARINE) || url.starts_with(MARINE_ARCHIVE) {
        Ok(hourly_body(&day, 24, &variables, surf_reading))
    } else if url.starts_with(FORECAST) || url.starts_with(ARCHIVE) {
        Ok(hourly_body(&day, 22, &variables, surf_reading))
    } else {
        Err(ForecastError::upstream(format!("no route for {url}")))
    }
}
