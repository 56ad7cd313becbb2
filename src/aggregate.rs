// src/aggregate.rs
//! Event aggregation: dedupe, drop past events, sort by date-time.

use chrono::NaiveDate;
use metrics::counter;
use std::collections::HashSet;

use crate::extract::types::Event;

/// Dedup key: series (or source URL when the series is blank), title and
/// calendar date. Time is left out so rows that differ only in inferred
/// time-of-day collapse.
fn dedup_key(ev: &Event) -> (String, String, NaiveDate) {
    let scope = if ev.series().trim().is_empty() {
        ev.source_url()
    } else {
        ev.series()
    };
    (scope.to_string(), ev.title().to_string(), ev.date())
}

/// Returns (kept, dedup_count, past_count).
pub fn dedup_filter_sort(today: NaiveDate, events: Vec<Event>) -> (Vec<Event>, usize, usize) {
    // First occurrence wins.
    let mut seen = HashSet::new();
    let mut dedup_out = 0usize;
    let mut unique = Vec::with_capacity(events.len());
    for ev in events {
        if !seen.insert(dedup_key(&ev)) {
            dedup_out += 1;
            continue;
        }
        unique.push(ev);
    }

    let before = unique.len();
    let mut kept: Vec<Event> = unique.into_iter().filter(|ev| ev.date() >= today).collect();
    let past_out = before - kept.len();

    // stable: equal instants keep input order
    kept.sort_by_key(|ev| ev.date_time());

    counter!("aggregate_dedup_total").increment(dedup_out as u64);
    counter!("aggregate_past_total").increment(past_out as u64);
    counter!("aggregate_kept_total").increment(kept.len() as u64);
    tracing::info!(
        target: "aggregate",
        kept = kept.len(),
        dedup = dedup_out,
        past = past_out,
        "events aggregated"
    );

    (kept, dedup_out, past_out)
}

pub fn aggregate(events: Vec<Event>, today: NaiveDate) -> Vec<Event> {
    dedup_filter_sort(today, events).0
}
