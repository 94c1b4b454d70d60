// src/dedup.rs
//! Deduplicating merge of move candidates.
//!
//! Sources overlap heavily: the same move shows up from several outlets within
//! seconds and feeds re-serve old items every poll. Two stages keep the output
//! idempotent:
//!
//! 1. **collapse**: per dedup key (player + move type) keep the latest
//!    candidate of the cycle. Equal timestamps go to the higher-confidence
//!    source, then to the first one seen.
//! 2. **admit**: a survivor passes only if its item key (player + move type +
//!    timestamp) was never admitted before *and* it is strictly newer than the
//!    store's current holder of its key.
//!
//! The seen set lives for the whole process and only grows.

use std::collections::{HashMap, HashSet};

use crate::model::{DedupKey, MoveEvent};
use crate::store::EventStore;

/// A classified event plus the confidence of the source that produced it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub event: MoveEvent,
    pub confidence: u8,
}

#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn seen_len(&self) -> usize {
        self.seen.len()
    }

    #[cfg(test)]
    fn has_seen(&self, item_key: &str) -> bool {
        self.seen.contains(item_key)
    }

    /// Run both stages against `store`; returns the newly admitted events
    /// (newest first). Does not touch the store itself.
    pub fn merge(&mut self, candidates: Vec<Candidate>, store: &EventStore) -> Vec<MoveEvent> {
        let mut admitted = Vec::new();
        for ev in collapse(candidates) {
            let key = ev.item_key();
            if self.seen.contains(&key) {
                continue;
            }
            if let Some(holder) = store.holder_of(&ev) {
                if ev.timestamp <= holder.timestamp {
                    continue;
                }
            }
            self.seen.insert(key);
            admitted.push(ev);
        }
        admitted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        admitted
    }
}

/// Intra-cycle stage: one candidate per dedup key, first-seen key order.
pub fn collapse(candidates: Vec<Candidate>) -> Vec<MoveEvent> {
    let mut order: Vec<DedupKey> = Vec::new();
    let mut best: HashMap<DedupKey, Candidate> = HashMap::new();

    for c in candidates {
        let key = c.event.dedup_key();
        match best.get(&key) {
            None => {
                order.push(key.clone());
                best.insert(key, c);
            }
            Some(cur) => {
                let newer = c.event.timestamp > cur.event.timestamp;
                let tie_wins =
                    c.event.timestamp == cur.event.timestamp && c.confidence > cur.confidence;
                if newer || tie_wins {
                    best.insert(key, c);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|k| best.remove(&k))
        .map(|c| c.event)
        .collect()
}
