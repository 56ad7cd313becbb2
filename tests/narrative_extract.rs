// tests/narrative_extract.rs
use chrono::{NaiveDate, NaiveTime};
use seminar_events::extract::providers::narrative::{
    extract_lines, parse_block, segment, Block, NarrativeSource,
};
use seminar_events::{EventSource, NarrativeLine, SourceConfig};
use std::fs;

fn imfs_cfg() -> SourceConfig {
    SourceConfig::new(
        "IMFS",
        "https://www.imfs-frankfurt.de/veranstaltungen/alle-kommenden-veranstaltungen",
        NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
    )
    .with_sentinel_heading("Alle kommenden Veranstaltungen")
}

#[test]
fn working_lunch_block_end_to_end() {
    let block = Block {
        label: "IMFS Working Lunch".into(),
        lines: [
            "Jane Doe, MIT",
            "\"A Great Talk\"",
            "27. November 2025",
            "12:30-13:30 Uhr",
            "Room X",
            "House Y",
            "Bitte melden Sie sich an",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    };

    let ev = parse_block(&block, &imfs_cfg()).expect("block parses");
    assert_eq!(ev.speaker(), "Jane Doe, MIT");
    assert_eq!(ev.title(), "A Great Talk");
    assert_eq!(
        ev.date_time(),
        NaiveDate::from_ymd_opt(2025, 11, 27)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    );
    assert_eq!(ev.location(), Some("Room X, House Y"));
}

#[test]
fn fixture_page_yields_two_events() {
    let raw = fs::read_to_string("tests/fixtures/imfs_lines.json")
        .expect("missing tests/fixtures/imfs_lines.json");
    let cfg = imfs_cfg().with_label_as_series(true);
    let source = NarrativeSource::from_json_str(cfg, &raw).expect("lines parse");

    let events = source.extract();
    assert_eq!(events.len(), 2, "newsletter block has no date and is dropped");

    assert_eq!(events[0].series(), "IMFS Working Lunch");
    assert_eq!(events[1].series(), "IMFS Distinguished Lecture");
    assert_eq!(events[1].title(), "Geldpolitik in der Zeitenwende");
    assert_eq!(
        events[1].date_time(),
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    );
    assert_eq!(events[1].location(), Some("Casino, Renate von Metzler-Saal"));
}

#[test]
fn segmentation_flushes_at_end_of_input() {
    let lines = vec![
        NarrativeLine::heading("Alle kommenden Veranstaltungen"),
        NarrativeLine::heading("Talk A"),
        NarrativeLine::paragraph("Speaker A"),
        NarrativeLine::heading("Talk B"),
        NarrativeLine::paragraph("Speaker B"),
    ];
    let blocks = segment(&lines, &imfs_cfg().sentinel_headings);
    let labels: Vec<&str> = blocks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Talk A", "Talk B"]);
    assert_eq!(blocks[1].lines, vec!["Speaker B".to_string()]);
}

#[test]
fn extraction_is_idempotent() {
    let raw = fs::read_to_string("tests/fixtures/imfs_lines.json").unwrap();
    let lines: Vec<NarrativeLine> = serde_json::from_str(&raw).unwrap();
    let cfg = imfs_cfg();

    let first = extract_lines(&cfg, &lines);
    let second = extract_lines(&cfg, &lines);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn custom_stop_phrases_replace_defaults() {
    let cfg = imfs_cfg().with_stop_phrases(["Anmeldung"]);
    let lines = vec![
        NarrativeLine::heading("Lecture"),
        NarrativeLine::paragraph("Jane Doe"),
        NarrativeLine::paragraph("\u{201C}Talk\u{201D}"),
        NarrativeLine::paragraph("27.11.2025"),
        NarrativeLine::paragraph("Room X"),
        NarrativeLine::paragraph("Bitte melden Sie sich an"),
        NarrativeLine::paragraph("Anmeldung bis 20.11."),
    ];
    let events = extract_lines(&cfg, &lines);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].location(), Some("Room X, Bitte melden Sie sich an"));
}

#[test]
fn malformed_line_is_skipped() {
    let raw = r#"[
        {"text": "Lecture", "isHeading": true},
        {"text": "Jane Doe"},
        {"isHeading": false},
        {"text": "\"Talk\""},
        {"text": "27.11.2025"}
    ]"#;
    let source = NarrativeSource::from_json_str(imfs_cfg(), raw).expect("array still loads");
    let events = source.extract();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title(), "Talk");
}
