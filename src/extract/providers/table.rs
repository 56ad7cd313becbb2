// src/extract/providers/table.rs
//! Tabular extractor: one row in, at most one event out.
//!
//! Rows without a parsable date ("Keine Ereignisse gefunden.", stray
//! captions) or without a title are dropped quietly. Time and location come
//! from the source configuration because table pages state them once for
//! the whole series.

use anyhow::Result;
use metrics::counter;
use tracing::debug;
use url::Url;

use crate::error::ExtractError;
use crate::extract::date::{normalize_date, strip_date_prefix};
use crate::extract::normalize_line;
use crate::extract::providers::parse_items;
use crate::extract::speaker::split_speaker_title;
use crate::extract::types::{Event, SourceConfig, TableRow};
use crate::extract::EventSource;

pub struct TableSource {
    config: SourceConfig,
    rows: Vec<TableRow>,
}

impl TableSource {
    pub fn new(config: SourceConfig, rows: Vec<TableRow>) -> Self {
        Self { config, rows }
    }

    /// Build from a captured JSON array of rows. Rows matching neither row
    /// shape are skipped.
    pub fn from_json_str(config: SourceConfig, s: &str) -> Result<Self> {
        let rows = parse_items::<TableRow>(s, "table", &config.series_name)?;
        Ok(Self::new(config, rows))
    }
}

impl EventSource for TableSource {
    fn extract(&self) -> Vec<Event> {
        extract_rows(&self.config, &self.rows)
    }

    fn name(&self) -> &str {
        &self.config.series_name
    }
}

pub fn extract_rows(config: &SourceConfig, rows: &[TableRow]) -> Vec<Event> {
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        counter!("extract_rows_total", "kind" => "table").increment(1);
        match extract_row(config, row) {
            Ok(ev) => out.push(ev),
            Err(e) => {
                debug!(
                    target: "extract",
                    series = %config.series_name,
                    row = i,
                    reason = e.reason(),
                    error = %e,
                    "table row dropped"
                );
                counter!("extract_dropped_total", "kind" => "table", "reason" => e.reason())
                    .increment(1);
            }
        }
    }
    counter!("extract_events_total", "kind" => "table").increment(out.len() as u64);
    out
}

pub fn extract_row(config: &SourceConfig, row: &TableRow) -> Result<Event, ExtractError> {
    let (date, speaker, title, link, raw) = match row {
        TableRow::Columns {
            date_text,
            speaker_text,
            title_text,
            link,
        } => {
            let date = normalize_date(&normalize_line(date_text))?;
            let raw = format!("{date_text} | {speaker_text} | {title_text}");
            (
                date,
                normalize_line(speaker_text),
                normalize_line(title_text),
                link,
                raw,
            )
        }
        TableRow::Combined {
            date_and_rest_text,
            link,
        } => {
            let line = normalize_line(date_and_rest_text);
            let (date, rest) =
                strip_date_prefix(&line).ok_or_else(|| ExtractError::InvalidDate(line.clone()))?;
            let (speaker, title) = split_speaker_title(rest);
            (date, speaker, title, link, date_and_rest_text.clone())
        }
    };

    if title.is_empty() {
        return Err(ExtractError::MissingTitle);
    }

    let details_url = link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| resolve_link(&config.source_url, l));

    Ok(Event::new(
        &config.series_name,
        &config.source_url,
        title,
        speaker,
        date.and_time(config.default_time),
    )
    .with_location(config.default_location.clone())
    .with_details_url(details_url)
    .with_raw_text(Some(raw)))
}

/// Resolve a (possibly relative) detail link against the page it came from.
/// Links that cannot be resolved are kept as given.
pub fn resolve_link(base: &str, link: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(link)) {
        Ok(u) => u.to_string(),
        Err(_) => link.to_string(),
    }
}
