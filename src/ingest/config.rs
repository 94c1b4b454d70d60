// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::SourceDescriptor;

pub const ENV_SOURCES_PATH: &str = "MOVES_SOURCES_PATH";

/// Load the source list from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources from {}", path.display()))
}

/// Resolve the source list:
/// 1) `explicit` (from $MOVES_SOURCES_PATH), which must exist
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in defaults
pub fn load_sources(explicit: Option<&Path>) -> Result<Vec<SourceDescriptor>> {
    if let Some(pb) = explicit {
        if pb.exists() {
            return load_sources_from(pb);
        } else {
            return Err(anyhow!(
                "{ENV_SOURCES_PATH} points to non-existent path {}",
                pb.display()
            ));
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
    Ok(builtin_sources())
}

/// Insider reporter feeds. Confidence reflects how often a report from that
/// desk is the confirmed transaction; the top two clear the official threshold.
pub fn builtin_sources() -> Vec<SourceDescriptor> {
    [
        ("shams", "https://nitter.net/ShamsCharania/rss", "Shams Charania", 95),
        ("haynes", "https://nitter.net/ChrisBHaynes/rss", "Chris Haynes", 90),
        ("stein", "https://nitter.net/TheSteinLine/rss", "Marc Stein", 85),
        ("underdog", "https://nitter.net/underdognba/rss", "Underdog NBA", 88),
        ("lowe", "https://nitter.net/ZachLowe_NBA/rss", "Zach Lowe", 80),
    ]
    .into_iter()
    .map(|(name, url, reporter, confidence)| SourceDescriptor {
        name: name.into(),
        url: url.into(),
        reporter: reporter.into(),
        confidence,
    })
    .collect()
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDescriptor>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
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
    Err(anyhow!("unsupported sources format"))
}

#[derive(serde::Deserialize)]
struct RawSource {
    name: String,
    url: String,
    #[serde(default)]
    reporter: Option<String>,
    #[serde(default = "default_confidence")]
    confidence: i64,
}

fn default_confidence() -> i64 {
    50
}

fn parse_toml(s: &str) -> Result<Vec<SourceDescriptor>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<RawSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<SourceDescriptor>> {
    let v: Vec<RawSource> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Drop blank entries, dedup by name (first wins), clamp confidence to 0..=100.
fn clean_list(items: Vec<RawSource>) -> Vec<SourceDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim().to_string();
        let url = it.url.trim().to_string();
        if name.is_empty() || url.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        let reporter = it
            .reporter
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| name.clone());
        out.push(SourceDescriptor {
            name,
            url,
            reporter,
            confidence: it.confidence.clamp(0, 100) as u8,
        });
    }
    out
}
