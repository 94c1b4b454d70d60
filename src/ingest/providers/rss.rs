// src/ingest/providers/rss.rs
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::normalize_text;
use crate::ingest::types::{FetchError, RawItem, SourceDescriptor, SourceProvider};

const USER_AGENT: &str = concat!("nba-moves-realtime/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RFC 2822 first (RSS 2.0), RFC 3339 as a fallback for feeds that send ISO timestamps.
pub(crate) fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        return DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct RssProvider {
    source: SourceDescriptor,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl RssProvider {
    /// Serve a fixed XML document instead of hitting the network.
    pub fn from_fixture(source: SourceDescriptor, xml: &str) -> Self {
        Self {
            source,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn http(source: SourceDescriptor, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .with_context(|| format!("building http client for source {}", source.name))?;
        Ok(Self {
            source,
            mode: Mode::Http { client },
        })
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>, FetchError> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let mut skipped = 0u64;
        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = it.title.as_deref().map(normalize_text).unwrap_or_default();
            let Some(published_at) = it.pub_date.as_deref().and_then(parse_pub_date) else {
                skipped += 1;
                continue;
            };
            if title.is_empty() {
                skipped += 1;
                continue;
            }

            out.push(RawItem {
                title,
                published_at,
                summary: it
                    .description
                    .as_deref()
                    .map(normalize_text)
                    .filter(|s| !s.is_empty()),
                link: it.link,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("moves_fetch_ms").record(ms);
        counter!("moves_source_items_total").increment(out.len() as u64);
        if skipped > 0 {
            tracing::debug!(target: "ingest", source = %self.source.name, skipped, "items without title/pubDate");
            counter!("moves_items_skipped_total").increment(skipped);
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { client } => {
                let resp = client.get(&self.source.url).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }
                let body = resp.text().await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn source(&self) -> &SourceDescriptor {
        &self.source
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
