// src/extract/mod.rs
pub mod config;
pub mod date;
pub mod providers;
pub mod speaker;
pub mod types;

pub use date::{find_date, normalize_date, strip_date_prefix};
pub use speaker::split_speaker_title;

use crate::extract::types::Event;
use chrono::NaiveDate;
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

/// Registration notices that end a narrative location span, unless a source
/// configures its own list.
pub const DEFAULT_STOP_PHRASES: &[&str] = &["Bitte melden", "Please register"];

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("extract_rows_total", "Rows or blocks handed to an extractor.");
        describe_counter!("extract_events_total", "Events produced by extractors.");
        describe_counter!(
            "extract_dropped_total",
            "Rows or blocks dropped, labelled by reason."
        );
        describe_counter!("aggregate_dedup_total", "Events removed as duplicates.");
        describe_counter!("aggregate_past_total", "Events removed for lying in the past.");
        describe_counter!("aggregate_kept_total", "Events kept after aggregation.");
        describe_gauge!(
            "extract_last_run_sources",
            "Number of sources in the last extraction run."
        );
    });
}

/// Something that turns one captured page region into events.
///
/// Implementations own their input; nothing is shared between sources.
pub trait EventSource {
    fn extract(&self) -> Vec<Event>;
    fn name(&self) -> &str;
}

/// Normalize cell text: decode HTML entities, collapse whitespace (NBSP
/// included), trim. Quotes and punctuation are left alone.
pub fn normalize_line(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Extract from every source, then dedupe, drop past events and sort.
/// Returns (kept, dedup_count, past_count).
pub fn run_once(sources: &[Box<dyn EventSource>], today: NaiveDate) -> (Vec<Event>, usize, usize) {
    ensure_metrics_described();

    let mut all = Vec::new();
    for s in sources {
        let events = s.extract();
        tracing::info!(
            target: "extract",
            source = s.name(),
            events = events.len(),
            "source extracted"
        );
        all.extend(events);
    }
    metrics::gauge!("extract_last_run_sources").set(sources.len() as f64);

    crate::aggregate::dedup_filter_sort(today, all)
}
