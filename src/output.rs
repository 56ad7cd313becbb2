// src/output.rs
//! JSON array output: one object per event, no envelope.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::extract::types::Event;

pub fn to_json_pretty(events: &[Event]) -> Result<String> {
    serde_json::to_string_pretty(events).context("serializing events")
}

pub fn from_json_str(s: &str) -> Result<Vec<Event>> {
    serde_json::from_str(s).context("parsing events json")
}

pub fn write_json(path: &Path, events: &[Event]) -> Result<()> {
    let body = to_json_pretty(events)?;
    fs::write(path, body).with_context(|| format!("writing events to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn field_names_and_iso_datetime() {
        let dt = NaiveDate::from_ymd_opt(2025, 11, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let ev = Event::new("S", "https://x.test", "On Markets", "Prof. A. Smith", dt)
            .with_location(Some("Room 1".into()));
        let json = to_json_pretty(&[ev]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = &v[0];
        assert_eq!(obj["dateTime"], "2025-11-04T12:00:00");
        assert_eq!(obj["sourceUrl"], "https://x.test");
        assert_eq!(obj["location"], "Room 1");
        assert!(obj["detailsUrl"].is_null());
        assert!(v.is_array());
    }
}
