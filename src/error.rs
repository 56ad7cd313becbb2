// src/error.rs
//! Per-record extraction failures.
//!
//! None of these are fatal: extractors log them, count them and drop the
//! single row or block that produced them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Date text matched none of the known shapes, or named an impossible day.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Narrative block from which no event could be recovered.
    #[error("incomplete block {label:?}: {reason}")]
    IncompleteBlock { label: String, reason: &'static str },

    /// Table row that carried a date but no title.
    #[error("row has no title")]
    MissingTitle,
}

impl ExtractError {
    /// Short machine-friendly label, used as the `reason` metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::InvalidDate(_) => "invalid_date",
            ExtractError::IncompleteBlock { .. } => "incomplete_block",
            ExtractError::MissingTitle => "missing_title",
        }
    }
}
