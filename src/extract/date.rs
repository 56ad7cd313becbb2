// src/extract/date.rs
//! Date normalizer shared by the table and narrative extractors.
//!
//! Accepted shapes, after `.` and `,` are folded to spaces:
//! - `04 Nov 2025`, `27. November 2025` (day, month name, year)
//! - `Nov 18, 2025` (month name, day, year)
//! - `27.11.2025` (day, month number, year)
//! - `2025-11-04` (ISO)
//!
//! Month names come from a bilingual English/German lexicon. Years must have
//! four digits; anything else is an `InvalidDate`, never a guess.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::ExtractError;

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,]").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

static RE_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}) (\d{1,2}) (\d{4})$").unwrap());
static RE_DAY_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}) (\p{L}+) (\d{4})$").unwrap());
static RE_MONTH_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{L}+) (\d{1,2}) (\d{4})$").unwrap());

/// Month names after folding (lowercase, umlauts spelled out, trailing `.` dropped).
const MONTH_NAMES: &[(u32, &[&str])] = &[
    (1, &["jan", "january", "januar", "jaenner", "janner"]),
    (2, &["feb", "febr", "february", "februar"]),
    (3, &["mar", "march", "maerz", "marz", "mrz"]),
    (4, &["apr", "april"]),
    (5, &["may", "mai"]),
    (6, &["jun", "june", "juni"]),
    (7, &["jul", "july", "juli"]),
    (8, &["aug", "august"]),
    (9, &["sep", "sept", "september"]),
    (10, &["oct", "october", "okt", "oktober"]),
    (11, &["nov", "november"]),
    (12, &["dec", "december", "dez", "dezember"]),
];

static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    MONTH_NAMES
        .iter()
        .flat_map(|(n, names)| names.iter().map(move |name| (*name, *n)))
        .collect()
});

/// Characters that may sit between a leading date and the rest of a line.
const SEPARATORS: &[char] = &['-', '\u{2013}', '\u{2014}', ':', '|', ',', ';'];

/// Token windows tried at each position: `27. November 2025` before `27.11.2025`.
const DATE_WIDTHS: [usize; 2] = [3, 1];

/// A date found inside a longer line, with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub start: usize,
    pub end: usize,
}

/// Resolve a month name (English or German, full or abbreviated) to 1..=12.
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTHS.get(fold_month(name).as_str()).copied()
}

fn fold_month(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name
        .trim()
        .trim_end_matches('.')
        .chars()
        .flat_map(char::to_lowercase)
    {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            // combining diaeresis (decomposed umlaut)
            '\u{0308}' => out.push('e'),
            c => out.push(c),
        }
    }
    out
}

/// Parse a whole string as a calendar date.
pub fn normalize_date(text: &str) -> Result<NaiveDate, ExtractError> {
    let s = RE_PUNCT.replace_all(text, " ");
    let s = RE_WS.replace_all(&s, " ");
    parse_normalized(s.trim()).ok_or_else(|| ExtractError::InvalidDate(text.trim().to_string()))
}

fn parse_normalized(s: &str) -> Option<NaiveDate> {
    if let Some(c) = RE_ISO.captures(s) {
        return date_from(&c[1], c[2].parse().ok()?, &c[3]);
    }
    if let Some(c) = RE_NUMERIC.captures(s) {
        return date_from(&c[3], c[2].parse().ok()?, &c[1]);
    }
    if let Some(c) = RE_DAY_FIRST.captures(s) {
        return date_from(&c[3], month_from_name(&c[2])?, &c[1]);
    }
    if let Some(c) = RE_MONTH_FIRST.captures(s) {
        return date_from(&c[3], month_from_name(&c[1])?, &c[2]);
    }
    None
}

fn date_from(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn token_spans(text: &str) -> Vec<(usize, usize)> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn match_at(text: &str, spans: &[(usize, usize)], i: usize) -> Option<DateMatch> {
    DATE_WIDTHS.iter().find_map(|&width| {
        let (start, _) = *spans.get(i)?;
        let (_, end) = *spans.get(i + width - 1)?;
        let candidate = text[start..end].trim_end_matches(SEPARATORS);
        normalize_date(candidate)
            .ok()
            .map(|date| DateMatch { date, start, end })
    })
}

/// First date anywhere in `text`, scanning tokens left to right.
pub fn find_date(text: &str) -> Option<DateMatch> {
    let spans = token_spans(text);
    (0..spans.len()).find_map(|i| match_at(text, &spans, i))
}

/// Date at the very start of `text`, plus the remainder with leading
/// separators stripped. `None` when the line does not open with a date.
pub fn strip_date_prefix(text: &str) -> Option<(NaiveDate, &str)> {
    let spans = token_spans(text);
    let m = match_at(text, &spans, 0)?;
    let rest = text[m.end..]
        .trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .trim_end();
    Some((m.date, rest))
}
