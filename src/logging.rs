//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level; `--verbose` forces debug.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.format == "json" {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to initialize JSON logging")
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to initialize logging")
    }
}
