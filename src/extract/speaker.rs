// src/extract/speaker.rs
//! Speaker/title splitting for sources that put both into one string.
//!
//! Rules, first match wins:
//! 1. Parenthesised affiliation: everything up to the last `)` is the speaker.
//! 2. Trailing `TBA`/`TBD`: that token is the title.
//! 3. Four or more tokens: the first two are the speaker.
//! 4. Otherwise the whole text is the speaker.
//!
//! Rule 3 assumes "Firstname Lastname". Single names and three-token inputs
//! cannot be split reliably and fall through to rule 3 or 4.

const TITLE_SEPARATORS: &[char] = &['-', '\u{2013}', '\u{2014}', ':'];
const PLACEHOLDER_TITLES: &[&str] = &["tba", "tbd"];

/// Split a combined "speaker + title" string. Both parts are always present,
/// either may be empty.
pub fn split_speaker_title(text: &str) -> (String, String) {
    let text = text.trim();

    if let Some(close) = text.rfind(')') {
        if text[..close].contains('(') {
            let speaker = text[..=close].trim();
            let title = text[close + 1..]
                .trim_start_matches(|c: char| c.is_whitespace() || TITLE_SEPARATORS.contains(&c))
                .trim_end();
            return (speaker.to_string(), title.to_string());
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let Some((last, rest)) = tokens.split_last() {
        if !rest.is_empty() && is_placeholder(last) {
            return (rest.join(" "), (*last).to_string());
        }
    }

    if tokens.len() >= 4 {
        return (tokens[..2].join(" "), tokens[2..].join(" "));
    }

    (tokens.join(" "), String::new())
}

fn is_placeholder(token: &str) -> bool {
    let t = token.trim_end_matches('.');
    PLACEHOLDER_TITLES.iter().any(|p| t.eq_ignore_ascii_case(p))
}
