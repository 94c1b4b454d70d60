// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{FetchError, RawItem, SourceDescriptor, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("moves_source_items_total", "Items parsed from source feeds.");
        describe_counter!(
            "moves_source_errors_total",
            "Source fetch/parse failures (timeout, HTTP status, malformed feed)."
        );
        describe_counter!(
            "moves_items_skipped_total",
            "Feed items dropped for missing title or publish time."
        );
        describe_counter!(
            "moves_unclassified_total",
            "Items that matched no move pattern."
        );
        describe_counter!("moves_candidates_total", "Classified move candidates.");
        describe_counter!("moves_admitted_total", "Moves admitted to the event store.");
        describe_counter!("moves_cycles_total", "Completed fetch cycles.");
        describe_counter!(
            "moves_cycle_dropped_total",
            "Cycle triggers dropped because a cycle was in flight."
        );
        describe_histogram!("moves_fetch_ms", "Feed parse time in milliseconds.");
        describe_gauge!("moves_store_size", "Events currently held by the store.");
        describe_gauge!("moves_subscribers", "Connected subscribers.");
        describe_gauge!("moves_last_cycle_ts", "Unix ts of the last completed cycle.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim stray punctuation.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Strip trailing sentence punctuation (keep quotes)
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    // 6) Length cap: 1000 chars
    if out.chars().count() > 1000 {
        out = out.chars().take(1000).collect();
    }

    out
}

/// Items from one source, tagged with that source's attribution.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: SourceDescriptor,
    pub items: Vec<RawItem>,
}

/// Outcome of fetching every source once.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub batches: Vec<SourceBatch>,
    pub failed: Vec<(String, FetchError)>,
}

impl FetchOutcome {
    pub fn item_count(&self) -> usize {
        self.batches.iter().map(|b| b.items.len()).sum()
    }
}

/// Fetch all sources concurrently, each on its own task and under its own timeout.
/// A failing or hanging source never affects the others; the result holds the
/// successful batches in provider order plus the failures.
pub async fn fetch_all(providers: &[Arc<dyn SourceProvider>], timeout: Duration) -> FetchOutcome {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for (idx, p) in providers.iter().enumerate() {
        let p = Arc::clone(p);
        set.spawn(async move {
            let res = match tokio::time::timeout(timeout, p.fetch_latest()).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::Timeout(timeout.as_millis() as u64)),
            };
            (idx, res)
        });
    }

    let mut slots: Vec<Option<Result<Vec<RawItem>, FetchError>>> =
        (0..providers.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, res)) => slots[idx] = Some(res),
            // A panicking provider leaves its slot empty; reported below.
            Err(e) => tracing::warn!(target: "ingest", error = %e, "source task aborted"),
        }
    }

    let mut out = FetchOutcome::default();
    for (p, slot) in providers.iter().zip(slots) {
        let source = p.source().clone();
        match slot.unwrap_or_else(|| Err(FetchError::TaskFailed("task panicked".into()))) {
            Ok(items) => {
                tracing::debug!(target: "ingest", source = %source.name, items = items.len(), "source fetched");
                out.batches.push(SourceBatch { source, items });
            }
            Err(e) => {
                tracing::warn!(target: "ingest", source = %source.name, error = %e, "source skipped this cycle");
                counter!("moves_source_errors_total").increment(1);
                out.failed.push((source.name, e));
            }
        }
    }
    out
}
