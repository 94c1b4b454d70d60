// src/hub.rs
//! Broadcast hub: subscriber registry + fan-out.
//!
//! Protocol (server -> client):
//! - `current-snapshot`: full store contents; sent once on join and after every delta
//! - `new-events`: moves admitted by the last cycle (only when non-empty)
//!
//! Each subscriber owns a bounded queue. Delivery is `try_send`: a closed or
//! full queue means the subscriber is gone or stuck, and it is dropped without
//! holding up anyone else.
//!
//! Join and broadcast serialize on the registry lock, so a joiner always gets
//! its snapshot before any delta, and snapshots never go backwards.

use metrics::gauge;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::model::MoveEvent;
use crate::store::EventStore;

pub const SUBSCRIBER_QUEUE: usize = 64;

/// Server -> client frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    CurrentSnapshot(Vec<MoveEvent>),
    NewEvents(Vec<MoveEvent>),
}

/// Client -> server frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    RequestRefresh,
}

pub type SubscriberId = u64;

/// Receiving half handed to a connection.
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::Receiver<ServerMessage>,
}

pub struct BroadcastHub {
    store: Arc<EventStore>,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<ServerMessage>>>,
    next_id: AtomicU64,
    queue: usize,
}

impl BroadcastHub {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self::with_queue(store, SUBSCRIBER_QUEUE)
    }

    pub fn with_queue(store: Arc<EventStore>, queue: usize) -> Self {
        Self {
            store,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue: queue.max(2),
        }
    }

    /// Register a subscriber; its queue already holds the current snapshot.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue);

        let mut subs = self.subscribers.lock();
        // Fresh queue with capacity >= 2: cannot fail.
        let _ = tx.try_send(ServerMessage::CurrentSnapshot(self.store.snapshot()));
        subs.insert(id, tx);
        gauge!("moves_subscribers").set(subs.len() as f64);
        tracing::debug!(target: "hub", subscriber = id, total = subs.len(), "subscriber joined");

        Subscription { id, rx }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subs = self.subscribers.lock();
        if subs.remove(&id).is_some() {
            gauge!("moves_subscribers").set(subs.len() as f64);
            tracing::debug!(target: "hub", subscriber = id, total = subs.len(), "subscriber left");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Send `delta` then the full snapshot to everyone. An empty delta sends
    /// nothing. Returns how many subscribers were dropped.
    pub fn broadcast(&self, delta: &[MoveEvent]) -> usize {
        if delta.is_empty() {
            return 0;
        }

        let mut subs = self.subscribers.lock();
        let snapshot = self.store.snapshot();
        let mut dead = Vec::new();

        for (id, tx) in subs.iter() {
            let ok = deliver(tx, ServerMessage::NewEvents(delta.to_vec()))
                && deliver(tx, ServerMessage::CurrentSnapshot(snapshot.clone()));
            if !ok {
                dead.push(*id);
            }
        }
        for id in &dead {
            subs.remove(id);
            tracing::info!(target: "hub", subscriber = id, "dropping unreachable subscriber");
        }
        gauge!("moves_subscribers").set(subs.len() as f64);

        tracing::info!(
            target: "hub",
            new_events = delta.len(),
            snapshot = snapshot.len(),
            subscribers = subs.len(),
            dropped = dead.len(),
            "broadcast"
        );
        dead.len()
    }
}

fn deliver(tx: &mpsc::Sender<ServerMessage>, msg: ServerMessage) -> bool {
    match tx.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
    }
}
