// src/extract/types.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::extract::DEFAULT_STOP_PHRASES;

/// One normalized talk/seminar record.
///
/// Fields are private: an `Event` is assembled once by an extractor and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    series: String,
    source_url: String,
    title: String,
    speaker: String,
    date_time: NaiveDateTime,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    details_url: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
}

impl Event {
    pub fn new(
        series: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        speaker: impl Into<String>,
        date_time: NaiveDateTime,
    ) -> Self {
        Self {
            series: series.into(),
            source_url: source_url.into(),
            title: title.into(),
            speaker: speaker.into(),
            date_time,
            location: None,
            details_url: None,
            raw_text: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_details_url(mut self, details_url: Option<String>) -> Self {
        self.details_url = details_url;
        self
    }

    pub fn with_raw_text(mut self, raw_text: Option<String>) -> Self {
        self.raw_text = raw_text;
        self
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.date_time
    }

    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn details_url(&self) -> Option<&str> {
        self.details_url.as_deref()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// Copy without the diagnostic `raw_text`, for comparisons across a
    /// serialization boundary where consumers may drop it.
    pub fn without_raw_text(&self) -> Self {
        Self {
            raw_text: None,
            ..self.clone()
        }
    }
}

/// Per-source settings supplied by whoever selected the page region.
///
/// The default time and location are facts about the series (stated once on
/// the page), not something the extractors discover.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub series_name: String,
    pub source_url: String,
    #[serde(deserialize_with = "de_time_of_day")]
    pub default_time: NaiveTime,
    #[serde(default)]
    pub default_location: Option<String>,
    /// Substrings that end a narrative location span (registration notices).
    #[serde(default = "default_stop_phrases")]
    pub stop_phrases: Vec<String>,
    /// Section headings that never open an event block.
    #[serde(default)]
    pub sentinel_headings: Vec<String>,
    /// Use each narrative block's heading as the event series.
    #[serde(default)]
    pub label_as_series: bool,
}

impl SourceConfig {
    pub fn new(
        series_name: impl Into<String>,
        source_url: impl Into<String>,
        default_time: NaiveTime,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            source_url: source_url.into(),
            default_time,
            default_location: None,
            stop_phrases: default_stop_phrases(),
            sentinel_headings: Vec::new(),
            label_as_series: false,
        }
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = Some(location.into());
        self
    }

    pub fn with_stop_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sentinel_heading(mut self, heading: impl Into<String>) -> Self {
        self.sentinel_headings.push(heading.into());
        self
    }

    pub fn with_label_as_series(mut self, on: bool) -> Self {
        self.label_as_series = on;
        self
    }
}

fn default_stop_phrases() -> Vec<String> {
    DEFAULT_STOP_PHRASES.iter().map(|s| s.to_string()).collect()
}

// "12:00" or "12:00:00"
fn de_time_of_day<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let s = String::deserialize(d)?;
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| serde::de::Error::custom(format!("bad time of day {s:?}: {e}")))
}

/// One table row as handed over by the structural selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TableRow {
    /// Date, speaker and title already sit in separate columns.
    #[serde(rename_all = "camelCase")]
    Columns {
        date_text: String,
        speaker_text: String,
        title_text: String,
        #[serde(default)]
        link: Option<String>,
    },
    /// A single "date + speaker + title" line.
    #[serde(rename_all = "camelCase")]
    Combined {
        date_and_rest_text: String,
        #[serde(default)]
        link: Option<String>,
    },
}

impl TableRow {
    pub fn columns(
        date: impl Into<String>,
        speaker: impl Into<String>,
        title: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        TableRow::Columns {
            date_text: date.into(),
            speaker_text: speaker.into(),
            title_text: title.into(),
            link,
        }
    }

    pub fn combined(text: impl Into<String>, link: Option<String>) -> Self {
        TableRow::Combined {
            date_and_rest_text: text.into(),
            link,
        }
    }
}

/// One visually ordered line of a free-text page region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeLine {
    pub text: String,
    #[serde(default)]
    pub is_heading: bool,
}

impl NarrativeLine {
    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_heading: true,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_heading: false,
        }
    }
}
