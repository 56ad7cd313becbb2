// src/extract/providers/narrative.rs
//! Narrative-block extractor for free-text page regions.
//!
//! Two stages:
//! - [`Segmenter`] turns a flat `{text, is_heading}` line stream into blocks.
//!   Headings close the open block and open a new one; sentinel headings
//!   (the section's own title) close it without opening another.
//! - [`parse_block`] reads one block as speaker, title, date, time, location.

use anyhow::Result;
use chrono::NaiveTime;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ExtractError;
use crate::extract::date::find_date;
use crate::extract::providers::parse_items;
use crate::extract::types::{Event, NarrativeLine, SourceConfig};
use crate::extract::EventSource;

static RE_CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());
static RE_UHR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\buhr\b").unwrap());
// "12.30 Uhr" / "14 Uhr" / "14-15 Uhr"
static RE_DOT_CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\.(\d{2})\b").unwrap());
static RE_HOUR_UHR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*(?:-\s*\d{1,2}\s*)?uhr\b").unwrap());

/// Straight double quotes plus typographic double and single quotes.
const QUOTES: &[char] = &[
    '"', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{00AB}', '\u{00BB}',
    '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2039}', '\u{203A}',
];

/// Quotes that can open a quoted span. `\u{2019}` doubles as the typographic
/// apostrophe, so on its own it does not mark a title line.
const OPENING_QUOTES: &[char] = &[
    '"', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{00AB}', '\u{00BB}',
    '\u{2018}', '\u{201A}', '\u{201B}', '\u{2039}', '\u{203A}',
];

/// Lines between two headings, labelled with the opening heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub label: String,
    pub lines: Vec<String>,
}

#[derive(Debug)]
enum State {
    Scanning,
    InBlock(Block),
}

/// Heading-delimited block accumulator.
#[derive(Debug)]
pub struct Segmenter {
    sentinels: Vec<String>,
    state: State,
    done: Vec<Block>,
}

impl Segmenter {
    pub fn new(sentinels: &[String]) -> Self {
        Self {
            sentinels: sentinels
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            state: State::Scanning,
            done: Vec::new(),
        }
    }

    pub fn push(&mut self, line: &NarrativeLine) {
        let text = line.text.trim();
        if line.is_heading {
            self.flush();
            if !self.is_sentinel(text) {
                self.state = State::InBlock(Block {
                    label: text.to_string(),
                    lines: Vec::new(),
                });
            }
            return;
        }
        if text.is_empty() {
            return;
        }
        if let State::InBlock(block) = &mut self.state {
            block.lines.push(text.to_string());
        }
    }

    /// Close the open block, if any, and go back to scanning.
    pub fn flush(&mut self) {
        if let State::InBlock(block) = std::mem::replace(&mut self.state, State::Scanning) {
            self.done.push(block);
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, State::Scanning)
    }

    /// Flush and hand back every block seen so far, in input order.
    pub fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.done
    }

    fn is_sentinel(&self, heading: &str) -> bool {
        let h = heading.to_lowercase();
        self.sentinels.iter().any(|s| *s == h)
    }
}

pub fn segment(lines: &[NarrativeLine], sentinels: &[String]) -> Vec<Block> {
    let mut seg = Segmenter::new(sentinels);
    for line in lines {
        seg.push(line);
    }
    seg.finish()
}

fn incomplete(block: &Block, reason: &'static str) -> ExtractError {
    ExtractError::IncompleteBlock {
        label: block.label.clone(),
        reason,
    }
}

/// Read one block as an event. Fails only when no date can be found.
pub fn parse_block(block: &Block, config: &SourceConfig) -> Result<Event, ExtractError> {
    let lines = &block.lines;
    let speaker = lines.first().ok_or_else(|| incomplete(block, "no lines"))?;

    let title = lines
        .iter()
        .skip(1)
        .find(|l| l.contains(OPENING_QUOTES))
        .map(|l| quoted_title(l))
        .or_else(|| lines.get(1).cloned())
        .unwrap_or_default();

    let (date_idx, date) = lines
        .iter()
        .enumerate()
        .find_map(|(i, l)| find_date(l).map(|m| (i, m.date)))
        .ok_or_else(|| incomplete(block, "no date"))?;

    let time_line = lines
        .iter()
        .enumerate()
        .skip(date_idx + 1)
        .find(|(_, l)| RE_CLOCK.is_match(l) || RE_UHR.is_match(l));

    let (time, location_from) = match time_line {
        Some((i, l)) => (time_of_day(l).unwrap_or(config.default_time), i + 1),
        None => (config.default_time, date_idx + 1),
    };

    let location = location_span(&lines[location_from..], &config.stop_phrases)
        .or_else(|| config.default_location.clone());

    let series = if config.label_as_series && !block.label.is_empty() {
        block.label.clone()
    } else {
        config.series_name.clone()
    };

    let mut raw = block.label.clone();
    for l in lines {
        raw.push('\n');
        raw.push_str(l);
    }

    Ok(Event::new(
        series,
        &config.source_url,
        title,
        speaker.clone(),
        date.and_time(time),
    )
    .with_location(location)
    .with_raw_text(Some(raw)))
}

/// Quoted span if the line has an opening and a closing quote, otherwise
/// the line with its quote characters removed.
fn quoted_title(line: &str) -> String {
    if let (Some(open), Some(close)) = (line.find(QUOTES), line.rfind(QUOTES)) {
        let open_len = line[open..].chars().next().map_or(1, char::len_utf8);
        if close > open {
            let inner = line[open + open_len..close].trim();
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }
    line.replace(QUOTES, "").trim().to_string()
}

fn hm(hour: &str, minute: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// First valid time on the line. Matches that are not a time of day (date
/// fragments such as `28.11`) are skipped.
fn time_of_day(line: &str) -> Option<NaiveTime> {
    let clock = || {
        RE_CLOCK
            .captures_iter(line)
            .find_map(|c| hm(&c[1], &c[2]))
    };
    if !RE_UHR.is_match(line) {
        return clock();
    }
    clock()
        .or_else(|| {
            RE_DOT_CLOCK
                .captures_iter(line)
                .find_map(|c| hm(&c[1], &c[2]))
        })
        .or_else(|| {
            RE_HOUR_UHR
                .captures_iter(line)
                .find_map(|c| hm(&c[1], "0"))
        })
}

fn location_span(lines: &[String], stop_phrases: &[String]) -> Option<String> {
    let stops: Vec<String> = stop_phrases
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let parts: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .take_while(|l| {
            let lower = l.to_lowercase();
            !stops.iter().any(|s| lower.contains(s.as_str()))
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub struct NarrativeSource {
    config: SourceConfig,
    lines: Vec<NarrativeLine>,
}

impl NarrativeSource {
    pub fn new(config: SourceConfig, lines: Vec<NarrativeLine>) -> Self {
        Self { config, lines }
    }

    /// Build from a captured JSON array of `{text, isHeading}` lines.
    pub fn from_json_str(config: SourceConfig, s: &str) -> Result<Self> {
        let lines = parse_items::<NarrativeLine>(s, "narrative", &config.series_name)?;
        Ok(Self::new(config, lines))
    }
}

impl EventSource for NarrativeSource {
    fn extract(&self) -> Vec<Event> {
        extract_lines(&self.config, &self.lines)
    }

    fn name(&self) -> &str {
        &self.config.series_name
    }
}

pub fn extract_lines(config: &SourceConfig, lines: &[NarrativeLine]) -> Vec<Event> {
    let blocks = segment(lines, &config.sentinel_headings);
    let mut out = Vec::with_capacity(blocks.len());
    for block in &blocks {
        counter!("extract_rows_total", "kind" => "narrative").increment(1);
        match parse_block(block, config) {
            Ok(ev) => out.push(ev),
            Err(e) => {
                debug!(
                    target: "extract",
                    series = %config.series_name,
                    label = %block.label,
                    reason = e.reason(),
                    error = %e,
                    "narrative block dropped"
                );
                counter!("extract_dropped_total", "kind" => "narrative", "reason" => e.reason())
                    .increment(1);
            }
        }
    }
    counter!("extract_events_total", "kind" => "narrative").increment(out.len() as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(t: &str) -> NarrativeLine {
        NarrativeLine::heading(t)
    }

    fn p(t: &str) -> NarrativeLine {
        NarrativeLine::paragraph(t)
    }

    fn block(lines: &[&str]) -> Block {
        Block {
            label: "IMFS Working Lunch".into(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn cfg() -> SourceConfig {
        SourceConfig::new(
            "IMFS",
            "https://www.example.de/veranstaltungen",
            NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        )
    }

    #[test]
    fn headings_open_and_flush_blocks() {
        let mut seg = Segmenter::new(&[]);
        assert!(seg.is_scanning());
        seg.push(&p("stray intro text"));
        assert!(seg.is_scanning());
        seg.push(&h("First"));
        seg.push(&p("  a  "));
        seg.push(&p(""));
        seg.push(&h("Second"));
        seg.push(&p("b"));
        assert!(!seg.is_scanning());
        let blocks = seg.finish();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].label, "First");
        assert_eq!(blocks[0].lines, vec!["a".to_string()]);
        assert_eq!(blocks[1].lines, vec!["b".to_string()]);
    }

    #[test]
    fn sentinel_heading_never_opens_a_block() {
        let lines = vec![
            h("Alle kommenden Veranstaltungen"),
            p("intro"),
            h("Talk"),
            p("x"),
            h("ALLE KOMMENDEN VERANSTALTUNGEN"),
            p("footer"),
        ];
        let blocks = segment(&lines, &["Alle kommenden Veranstaltungen".to_string()]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].label, "Talk");
        assert_eq!(blocks[0].lines, vec!["x".to_string()]);
    }

    #[test]
    fn typographic_quotes_give_title_span() {
        assert_eq!(quoted_title("\u{201E}Geldpolitik heute\u{201C}, Vortrag"), "Geldpolitik heute");
        assert_eq!(quoted_title("\u{201C}Unclosed title"), "Unclosed title");
        assert_eq!(quoted_title("Title with \"\""), "Title with");
    }

    #[test]
    fn title_falls_back_to_second_line() {
        let ev = parse_block(&block(&["Jane Doe", "A Talk", "27.11.2025"]), &cfg()).unwrap();
        assert_eq!(ev.title(), "A Talk");
    }

    #[test]
    fn missing_time_uses_default_and_location_follows_date() {
        let ev = parse_block(
            &block(&["Jane Doe", "\"T\"", "27. November 2025", "Room X", "Anmeldung: bitte melden"]),
            &cfg(),
        )
        .unwrap();
        assert_eq!(ev.date_time().time(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(ev.location(), Some("Room X"));
    }

    #[test]
    fn uhr_without_minutes() {
        assert_eq!(time_of_day("14 Uhr"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(time_of_day("14-15 Uhr"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(time_of_day("12.30 - 13.30 Uhr"), NaiveTime::from_hms_opt(12, 30, 0));
        assert_eq!(time_of_day("ab Mittag, Uhrzeit folgt"), None);
        assert_eq!(time_of_day("25:99"), None);
    }

    #[test]
    fn date_fragment_on_time_line_is_skipped() {
        assert_eq!(time_of_day("bis 28.11.2025, 9 Uhr"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(time_of_day("28.11., 10.15 Uhr"), NaiveTime::from_hms_opt(10, 15, 0));
        assert_eq!(time_of_day("Einlass 25:00, Beginn 18:30"), NaiveTime::from_hms_opt(18, 30, 0));
    }

    #[test]
    fn single_typographic_quotes_mark_the_title() {
        assert_eq!(quoted_title("\u{2018}A Great Talk\u{2019}"), "A Great Talk");
        assert_eq!(quoted_title("\u{201A}Geldpolitik\u{2018}"), "Geldpolitik");
        let ev = parse_block(
            &block(&["Jane Doe", "Intro", "\u{2018}A Great Talk\u{2019}", "27.11.2025"]),
            &cfg(),
        )
        .unwrap();
        assert_eq!(ev.title(), "A Great Talk");
    }

    #[test]
    fn apostrophe_alone_is_not_a_quote() {
        let ev = parse_block(
            &block(&["Jane O\u{2019}Brien", "On Markets", "27.11.2025", "Doe\u{2019}s Hall"]),
            &cfg(),
        )
        .unwrap();
        assert_eq!(ev.title(), "On Markets");
        assert_eq!(ev.location(), Some("Doe\u{2019}s Hall"));
    }

    #[test]
    fn block_without_date_is_incomplete() {
        let err = parse_block(&block(&["Jane Doe", "\"T\""]), &cfg()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::IncompleteBlock {
                label: "IMFS Working Lunch".into(),
                reason: "no date"
            }
        );
        assert!(parse_block(&block(&[]), &cfg()).is_err());
    }

    #[test]
    fn label_as_series_and_default_location() {
        let config = cfg()
            .with_label_as_series(true)
            .with_default_location("House of Finance");
        let ev = parse_block(&block(&["Jane Doe", "\"T\"", "27.11.2025", "12:30 Uhr"]), &config).unwrap();
        assert_eq!(ev.series(), "IMFS Working Lunch");
        assert_eq!(ev.location(), Some("House of Finance"));
    }
}
