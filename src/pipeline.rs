// src/pipeline.rs
//! Raw feed item -> move candidate, and the single-writer merge state.

use metrics::counter;
use std::sync::Arc;

use crate::dedup::{Candidate, Deduplicator};
use crate::extract::{classification_text, extract};
use crate::ingest::types::{RawItem, SourceDescriptor};
use crate::ingest::SourceBatch;
use crate::model::{item_key, MoveEvent};
use crate::resolve::{resolve_player, resolve_team};
use crate::store::EventStore;

/// Stable event id: first 8 bytes of SHA-256 over the item key, hex.
pub fn event_id(item_key: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(item_key.as_bytes());
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Classify one item. `None` = no pattern hit or no usable player name.
pub fn classify(item: &RawItem, source: &SourceDescriptor, official_threshold: u8) -> Option<Candidate> {
    let text = classification_text(&item.title, item.summary.as_deref());
    let ex = extract(&text)?;
    let player = resolve_player(&ex.player_fragment)?;
    let to_team = ex.team_fragment.as_deref().and_then(resolve_team);

    let timestamp = item.published_at;
    let event = MoveEvent {
        id: event_id(&item_key(&player.name, ex.move_type, timestamp)),
        player,
        from_team: None,
        to_team,
        move_type: ex.move_type,
        date: timestamp.format("%Y-%m-%d").to_string(),
        timestamp,
        details: item.title.clone(),
        source: source.reporter.clone(),
        is_official: source.confidence >= official_threshold,
        trade_assets: None,
        salary_cap_impact: None,
        contract: None,
    };
    Some(Candidate {
        event,
        confidence: source.confidence,
    })
}

/// Classify every item of every batch, in batch order.
pub fn classify_batches(batches: &[SourceBatch], official_threshold: u8) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut misses = 0u64;
    for batch in batches {
        for item in &batch.items {
            match classify(item, &batch.source, official_threshold) {
                Some(c) => out.push(c),
                None => misses += 1,
            }
        }
    }
    counter!("moves_unclassified_total").increment(misses);
    counter!("moves_candidates_total").increment(out.len() as u64);
    out
}

/// Mutable pipeline state: seen set + event store. Only the merge phase of a
/// cycle writes here, and merges never overlap.
#[derive(Debug)]
pub struct PipelineState {
    dedup: Deduplicator,
    store: Arc<EventStore>,
}

impl PipelineState {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            dedup: Deduplicator::new(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Dedup `candidates` against history and admit the survivors.
    /// Returns the delta (newest first).
    pub fn merge_and_admit(&mut self, candidates: Vec<Candidate>) -> Vec<MoveEvent> {
        let admitted = self.dedup.merge(candidates, &self.store);
        if !admitted.is_empty() {
            self.store.admit(admitted.clone());
            counter!("moves_admitted_total").increment(admitted.len() as u64);
        }
        admitted
    }
}
