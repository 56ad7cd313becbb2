//! seminar-events — CLI entrypoint.
//! Reads the configured sources and their captured page text, extracts the
//! upcoming events and prints them as one JSON array.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seminar_events::extract::{self, config, EventSource};
use seminar_events::output;

#[derive(Parser)]
#[command(name = "seminar-events", about = "Extract upcoming talks from captured seminar pages")]
struct Cli {
    /// Sources file (TOML or JSON). Default: $SEMINAR_SOURCES_PATH, then config/sources.{toml,json}
    #[arg(short, long)]
    sources: Option<PathBuf>,
    /// Drop events before this date, YYYY-MM-DD (default: today, local time)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Write the JSON array to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Logs go to stderr so stdout carries only the JSON output.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    // Load .env in local/dev; SEMINAR_SOURCES_PATH and RUST_LOG may live there.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let entries = match &cli.sources {
        Some(p) => config::load_sources_from(p)?,
        None => config::load_sources_default()?,
    };
    if entries.is_empty() {
        warn!("no sources configured");
    }

    let mut sources: Vec<Box<dyn EventSource>> = Vec::with_capacity(entries.len());
    let mut failed = 0usize;
    for entry in &entries {
        match entry.load() {
            Ok(s) => sources.push(s),
            Err(e) => {
                failed += 1;
                warn!(error = ?e, series = %entry.config.series_name, "source input not loaded");
            }
        }
    }
    if !entries.is_empty() && failed == entries.len() {
        bail!("all {failed} sources failed to load");
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let (events, dedup, past) = extract::run_once(&sources, today);

    match &cli.out {
        Some(path) => {
            output::write_json(path, &events)?;
            info!(events = events.len(), dedup, past, path = %path.display(), "wrote events");
        }
        None => {
            println!("{}", output::to_json_pretty(&events)?);
            info!(events = events.len(), dedup, past, "wrote events");
        }
    }
    Ok(())
}
