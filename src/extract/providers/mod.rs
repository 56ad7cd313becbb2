pub mod narrative;
pub mod table;

use anyhow::{Context, Result};
use metrics::counter;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Parse a captured JSON array item by item. Items that do not fit `T` are
/// logged, counted and skipped; only a document that is not an array fails.
pub(crate) fn parse_items<T: DeserializeOwned>(
    s: &str,
    kind: &'static str,
    series: &str,
) -> Result<Vec<T>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(s)
        .with_context(|| format!("parsing {kind} input for {series:?}"))?;
    let mut items = Vec::with_capacity(raw.len());
    for (i, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(item) => items.push(item),
            Err(e) => {
                debug!(
                    target: "extract",
                    series = %series,
                    row = i,
                    reason = "malformed_row",
                    error = %e,
                    "input item dropped"
                );
                counter!("extract_dropped_total", "kind" => kind, "reason" => "malformed_row")
                    .increment(1);
            }
        }
    }
    Ok(items)
}
