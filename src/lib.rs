// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod output;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, dedup_filter_sort};
pub use crate::error::ExtractError;
pub use crate::extract::types::{Event, NarrativeLine, SourceConfig, TableRow};
pub use crate::extract::{normalize_date, split_speaker_title, EventSource};
