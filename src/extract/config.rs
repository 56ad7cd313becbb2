// src/extract/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::extract::providers::{narrative::NarrativeSource, table::TableSource};
use crate::extract::types::SourceConfig;
use crate::extract::EventSource;

pub const ENV_PATH: &str = "SEMINAR_SOURCES_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Table,
    Narrative,
}

/// One configured source: how to read it, where its captured input lives,
/// and the series-level defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub kind: SourceKind,
    /// Captured JSON input; relative paths are resolved against the sources file.
    pub input: PathBuf,
    #[serde(flatten)]
    pub config: SourceConfig,
}

impl SourceEntry {
    /// Read the captured input and build the matching extractor.
    pub fn load(&self) -> Result<Box<dyn EventSource>> {
        let raw = fs::read_to_string(&self.input).with_context(|| {
            format!(
                "reading input for {:?} from {}",
                self.config.series_name,
                self.input.display()
            )
        })?;
        Ok(match self.kind {
            SourceKind::Table => Box::new(TableSource::from_json_str(self.config.clone(), &raw)?),
            SourceKind::Narrative => {
                Box::new(NarrativeSource::from_json_str(self.config.clone(), &raw)?)
            }
        })
    }
}

#[derive(Deserialize)]
struct SourcesFile {
    #[serde(default)]
    source: Vec<SourceEntry>,
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mut entries = parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources in {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for e in &mut entries {
        if e.input.is_relative() {
            e.input = base.join(&e.input);
        }
    }
    Ok(entries)
}

/// Load sources using env var + fallbacks:
/// 1) $SEMINAR_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
pub fn load_sources_default() -> Result<Vec<SourceEntry>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceEntry>> {
    let try_toml = hint_ext == "toml" || s.contains("[[source]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Re-run the hinted parser so the caller sees its error.
    if try_toml {
        parse_toml(s)
    } else {
        parse_json(s)
    }
}

fn parse_toml(s: &str) -> Result<Vec<SourceEntry>> {
    let v: SourcesFile = toml::from_str(s)?;
    Ok(v.source)
}

fn parse_json(s: &str) -> Result<Vec<SourceEntry>> {
    let v: SourcesFile = serde_json::from_str(s)?;
    Ok(v.source)
}
