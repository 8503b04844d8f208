use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use swellcast::export::write_csv_file;
use swellcast::{
    DateWindow, ForecastError, ForecastOptions, ForecastService, HistoricalCollector, JoinKind,
    SurfForecast, SwellcastConfig, TideExtrema, TideExtremum,
};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "swellcast", version)]
#[command(about = "Surf forecasts, wave quality scores and tides for any beach")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hourly surf forecast with wave quality scores
    Forecast {
        location: String,
        /// Number of days starting today
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_FORECAST_DAYS))]
        days: Option<u32>,
        #[arg(long, value_enum)]
        join: Option<JoinArg>,
        /// Include the next high and low tide
        #[arg(long)]
        tides: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Next high and low tide
    Tides {
        location: String,
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=MAX_FORECAST_DAYS))]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// Collect scored historical data into a CSV file
    Collect {
        location: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: NaiveDate,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: NaiveDate,
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Resolve a location name to coordinates
    Geocode { location: String },
}

/// Upstream forecast horizon
const MAX_FORECAST_DAYS: i64 = 16;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum JoinArg {
    /// Only hours present in both marine and wind data
    Inner,
    /// Every hour, with gaps left empty
    Outer,
}

impl From<JoinArg> for JoinKind {
    fn from(arg: JoinArg) -> Self {
        match arg {
            JoinArg::Inner => JoinKind::Inner,
            JoinArg::Outer => JoinKind::Outer,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SwellcastConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = swellcast::logging::init(&config.logging, cli.verbose) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ForecastError>() {
                Some(forecast_error) => {
                    error!("{}", forecast_error);
                    eprintln!("{}", forecast_error.user_message());
                }
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &SwellcastConfig) -> Result<()> {
    let service = ForecastService::from_config(config)?;

    match command {
        Command::Forecast {
            location,
            days,
            join,
            tides,
            json,
        } => {
            let mut options = ForecastOptions::from_config(&config.forecast);
            options.days = days.unwrap_or(options.days);
            options.join = join.map_or(options.join, JoinKind::from);
            options.include_tides = tides;

            let forecast = service.forecast(&location, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                print_forecast(&forecast);
            }
        }
        Command::Tides {
            location,
            days,
            json,
        } => {
            let (location, tides) = service.tides_for(&location, days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tides)?);
            } else {
                println!("Tides for {}", location.name);
                print_tides(&tides);
            }
        }
        Command::Collect {
            location,
            start,
            end,
            output,
        } => {
            let window = DateWindow::new(start, end)?;
            let collector =
                HistoricalCollector::new(&service, Duration::from_millis(config.collection.pacing_ms));
            let (location, data, report) = collector.collect(&location, window)?;

            let path = output.unwrap_or_else(|| PathBuf::from(&config.collection.output_path));
            write_csv_file(&path, &data)?;
            println!(
                "Collected {} rows for {} ({} of {} days). Saved to '{}'.",
                report.rows,
                location.name,
                report.days_collected,
                report.days_requested,
                path.display()
            );
        }
        Command::Geocode { location } => {
            let location = service.resolve(&location)?;
            println!("{}: {}", location.name, location.coordinate.format_coordinates());
        }
    }

    Ok(())
}

fn print_forecast(forecast: &SurfForecast) {
    println!(
        "{} ({})",
        forecast.location.name,
        forecast.location.coordinate.format_coordinates()
    );
    println!(
        "{:<17} {:>7} {:>7} {:>9} {:>6}",
        "time", "swell m", "period", "wind km/h", "score"
    );

    let fmt = |value: Option<f64>, precision: usize| {
        value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
    };
    for row in forecast.forecast.rows() {
        println!(
            "{:<17} {:>7} {:>7} {:>9} {:>6}",
            row.timestamp.format("%Y-%m-%d %H:%M"),
            fmt(row.value(swellcast::variables::SWELL_WAVE_HEIGHT), 2),
            fmt(row.value(swellcast::variables::SWELL_WAVE_PERIOD), 1),
            fmt(row.value(swellcast::variables::WIND_SPEED_10M), 1),
            fmt(row.wave_quality_score, 1),
        );
    }

    if let Some(tides) = &forecast.tides {
        println!();
        print_tides(tides);
    }
}

fn print_tides(tides: &TideExtrema) {
    let line = |label: &str, tide: Option<&TideExtremum>| match tide {
        Some(t) => println!(
            "  {label}: {} ({:+.2} m)",
            t.time.format("%a %Y-%m-%d %H:%M"),
            t.height_m
        ),
        None => println!("  {label}: none in range"),
    };
    line("Next high tide", tides.next_high_tide.as_ref());
    line("Next low tide", tides.next_low_tide.as_ref());
}
