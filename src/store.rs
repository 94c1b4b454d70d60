//! Bounded, time-ordered buffer of admitted moves.
//!
//! Newest first. At most one event per dedup key; `admit` replaces an older
//! holder of the same key. Readers get a consistent copy: the sorted and
//! truncated buffer is built off to the side and swapped in under the lock.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::model::MoveEvent;

#[derive(Debug)]
pub struct EventStore {
    inner: RwLock<Vec<MoveEvent>>,
    cap: usize,
}

impl EventStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            inner: RwLock::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Insert `events`, keep timestamp-descending order, truncate to capacity.
    pub fn admit(&self, events: Vec<MoveEvent>) {
        if events.is_empty() {
            return;
        }

        // Upgradable: snapshots keep reading while the next buffer is built,
        // a concurrent admit waits.
        let cur = self.inner.upgradable_read();
        let mut next: Vec<MoveEvent> = cur
            .iter()
            .filter(|held| !events.iter().any(|e| e.dedup_key() == held.dedup_key()))
            .cloned()
            .collect();
        next.extend(events);
        // Stable: on equal timestamps the earlier-admitted event stays ahead.
        next.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        next.truncate(self.cap);
        let size = next.len();

        *RwLockUpgradableReadGuard::upgrade(cur) = next;
        metrics::gauge!("moves_store_size").set(size as f64);
    }

    /// Full buffer, newest first.
    pub fn snapshot(&self) -> Vec<MoveEvent> {
        self.inner.read().clone()
    }

    /// Current holder for the event's dedup key, if any.
    pub fn holder_of(&self, ev: &MoveEvent) -> Option<MoveEvent> {
        let key = ev.dedup_key();
        self.inner
            .read()
            .iter()
            .find(|held| held.dedup_key() == key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{move_at, ts};

    #[test]
    fn snapshot_is_sorted_desc() {
        let s = EventStore::with_capacity(10);
        s.admit(vec![move_at("A", 10), move_at("B", 30)]);
        s.admit(vec![move_at("C", 20)]);
        let names: Vec<String> = s.snapshot().into_iter().map(|e| e.player.name).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let s = EventStore::with_capacity(50);
        s.admit((1..=50).map(|i| move_at(&format!("P{i}"), i)).collect());
        assert_eq!(s.len(), 50);

        s.admit(vec![move_at("P51", 51)]);
        let snap = s.snapshot();
        assert_eq!(snap.len(), 50);
        assert!(snap.iter().all(|e| e.player.name != "P1"));
        assert_eq!(snap.first().unwrap().player.name, "P51");
        assert_eq!(snap.last().unwrap().player.name, "P2");
    }

    #[test]
    fn same_key_replaces_holder() {
        let s = EventStore::with_capacity(10);
        s.admit(vec![move_at("A", 10)]);
        s.admit(vec![move_at("A", 20)]);
        let snap = s.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].timestamp, ts(20));
    }

    #[test]
    fn holder_lookup() {
        let s = EventStore::with_capacity(10);
        assert!(s.holder_of(&move_at("A", 1)).is_none());
        s.admit(vec![move_at("A", 5)]);
        assert_eq!(s.holder_of(&move_at("A", 1)).unwrap().timestamp, ts(5));
    }
}
