//! # Cycle engine
//! One fetch -> classify -> merge -> broadcast pass over all sources.
//!
//! The engine owns the providers, the merge state and the hub. It reports the
//! phase it is in through a `watch` channel; the scheduler decides *when* a
//! cycle runs, the engine decides *what* a cycle does.

use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::hub::BroadcastHub;
use crate::ingest::{self, types::SourceProvider};
use crate::model::MoveEvent;
use crate::pipeline::{classify_batches, PipelineState};
use crate::store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Fetching,
    Merging,
    Broadcasting,
    Stopped,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Fetching | Phase::Merging | Phase::Broadcasting)
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub items: usize,
    pub candidates: usize,
    pub admitted: Vec<MoveEvent>,
    pub dropped_subscribers: usize,
}

pub struct EngineSettings {
    pub source_timeout: Duration,
    pub official_threshold: u8,
}

pub struct Engine {
    providers: Vec<Arc<dyn SourceProvider>>,
    settings: EngineSettings,
    state: Mutex<PipelineState>,
    hub: Arc<BroadcastHub>,
}

impl Engine {
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        settings: EngineSettings,
        store: Arc<EventStore>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            providers,
            settings,
            state: Mutex::new(PipelineState::new(store)),
            hub,
        }
    }

    pub fn source_count(&self) -> usize {
        self.providers.len()
    }

    /// Run a full cycle, publishing phase changes on `phase`.
    /// Leaves `phase` at `Broadcasting`; resetting to idle is the caller's call.
    pub async fn run_cycle(&self, phase: &watch::Sender<Phase>) -> CycleReport {
        phase.send_replace(Phase::Fetching);
        let fetched = ingest::fetch_all(&self.providers, self.settings.source_timeout).await;

        phase.send_replace(Phase::Merging);
        let candidates = classify_batches(&fetched.batches, self.settings.official_threshold);
        let n_candidates = candidates.len();
        let admitted = self.state.lock().merge_and_admit(candidates);

        phase.send_replace(Phase::Broadcasting);
        let dropped = self.hub.broadcast(&admitted);

        for ev in &admitted {
            tracing::info!(
                target: "engine",
                id = %ev.id,
                player = %ev.player.name,
                move_type = %ev.move_type,
                to_team = ev.to_team.as_ref().map(|t| t.abbreviation.as_str()).unwrap_or("-"),
                source = %ev.source,
                "new move"
            );
        }
        counter!("moves_cycles_total").increment(1);
        gauge!("moves_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);

        let report = CycleReport {
            sources_ok: fetched.batches.len(),
            sources_failed: fetched.failed.len(),
            items: fetched.item_count(),
            candidates: n_candidates,
            admitted,
            dropped_subscribers: dropped,
        };
        tracing::info!(
            target: "engine",
            sources_ok = report.sources_ok,
            sources_failed = report.sources_failed,
            items = report.items,
            candidates = report.candidates,
            admitted = report.admitted.len(),
            "cycle finished"
        );
        report
    }
}
