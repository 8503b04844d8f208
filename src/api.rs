//! HTTP transport for the Open-Meteo family of APIs
//!
//! This module provides the blocking HTTP client used by the geocoder and the
//! source fetchers, with a per-minute courtesy throttle. Requests are never
//! retried here; failures are classified and handed back to the caller.

use crate::config::HttpConfig;
use crate::{ForecastError, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Seam between the pipeline and the network
pub trait HttpTransport: Send + Sync {
    /// GET `url` and decode the body as JSON
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// Rate limiter for API requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per minute
    max_requests_per_minute: u32,
    /// Request timestamps within the trailing minute
    request_times: Vec<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute: max_requests_per_minute.max(1),
            request_times: Vec::new(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        self.cleanup_old_requests();

        if self.request_times.len() < self.max_requests_per_minute as usize {
            return Duration::ZERO;
        }
        self.request_times
            .first()
            .map(|oldest| Duration::from_secs(60).saturating_sub(oldest.elapsed()))
            .unwrap_or(Duration::ZERO)
    }

    /// Remove requests older than 1 minute
    fn cleanup_old_requests(&mut self) {
        let window = Duration::from_secs(60);
        self.request_times.retain(|time| time.elapsed() < window);
    }
}

/// Blocking reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
    rate_limiter: Mutex<RateLimiter>,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ForecastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            rate_limiter: Mutex::new(RateLimiter::new(config.max_requests_per_minute)),
        })
    }

    /// Block until the throttle admits one more request
    fn throttle(&self) {
        loop {
            let wait = {
                let mut limiter = self
                    .rate_limiter
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                if limiter.allow_request() {
                    return;
                }
                limiter.time_until_next_request()
            };
            warn!("Rate limit reached, waiting {:.1}s", wait.as_secs_f64());
            thread::sleep(wait.max(Duration::from_millis(50)));
        }
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self))]
    fn get_json(&self, url: &str) -> Result<Value> {
        self.throttle();

        let start_time = Instant::now();
        debug!("Sending GET request");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ForecastError::upstream(format!("Network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::upstream(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| ForecastError::malformed(format!("Response is not valid JSON: {e}")))?;

        let total_duration = start_time.elapsed();
        info!(
            "Successful API request in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

/// Append URL-encoded query parameters to `base`
#[must_use]
pub fn with_query(base: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}
