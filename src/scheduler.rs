// src/scheduler.rs
//! Cycle scheduler.
//!
//! `Idle -> Fetching -> Merging -> Broadcasting -> Idle`, with `Stopped`
//! reachable from anywhere through [`SchedulerHandle::stop`].
//!
//! One loop owns the cycle state. Three triggers feed it: the primary tick,
//! the backup tick and manual refresh requests. A trigger that arrives while a
//! cycle is in flight is dropped, not queued; the next tick picks up whatever
//! was missed. Manual refreshes never touch the timers.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::engine::{CycleReport, Engine, Phase};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub primary: Duration,
    pub backup: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Refresh,
    Stop,
    Start,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Primary,
    Backup,
    Manual,
}

/// Control surface for a running scheduler. Cheap to clone.
#[derive(Clone)]
pub struct SchedulerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    phase_rx: watch::Receiver<Phase>,
    cycles_rx: watch::Receiver<u64>,
}

impl SchedulerHandle {
    /// Ask for an out-of-band cycle. Dropped if one is already running.
    pub fn refresh(&self) -> bool {
        self.cmd_tx.send(Command::Refresh).is_ok()
    }

    /// Cancel the timers; an in-flight cycle finishes, nothing new starts.
    pub fn stop(&self) -> bool {
        self.cmd_tx.send(Command::Stop).is_ok()
    }

    /// Restart after `stop`, with fresh timers (the primary fires immediately).
    pub fn start(&self) -> bool {
        self.cmd_tx.send(Command::Start).is_ok()
    }

    pub fn phase(&self) -> Phase {
        *self.phase_rx.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase_rx.clone()
    }

    pub fn cycles_completed(&self) -> u64 {
        *self.cycles_rx.borrow()
    }

    /// Resolve once at least `n` cycles have completed.
    pub async fn wait_for_cycles(&self, n: u64) {
        let mut rx = self.cycles_rx.clone();
        let _ = rx.wait_for(|c| *c >= n).await;
    }
}

/// Spawn the scheduler loop. The first primary tick fires right away.
pub fn spawn_scheduler(engine: Arc<Engine>, cfg: SchedulerCfg) -> (SchedulerHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (phase_tx, phase_rx) = watch::channel(Phase::Idle);
    let (cycles_tx, cycles_rx) = watch::channel(0u64);

    let task = tokio::spawn(run_loop(engine, cfg, cmd_rx, Arc::new(phase_tx), cycles_tx));
    (
        SchedulerHandle {
            cmd_tx,
            phase_rx,
            cycles_rx,
        },
        task,
    )
}

fn timers(cfg: &SchedulerCfg) -> (Interval, Interval) {
    let now = Instant::now();
    let mut primary = interval_at(now, cfg.primary);
    primary.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut backup = interval_at(now + cfg.backup, cfg.backup);
    backup.set_missed_tick_behavior(MissedTickBehavior::Skip);
    (primary, backup)
}

async fn join_in_flight(h: &mut Option<JoinHandle<CycleReport>>) -> Result<CycleReport, JoinError> {
    match h {
        Some(h) => h.await,
        None => std::future::pending().await,
    }
}

async fn run_loop(
    engine: Arc<Engine>,
    cfg: SchedulerCfg,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    phase_tx: Arc<watch::Sender<Phase>>,
    cycles_tx: watch::Sender<u64>,
) {
    let (mut primary, mut backup) = timers(&cfg);
    let mut in_flight: Option<JoinHandle<CycleReport>> = None;
    let mut stopped = false;

    tracing::info!(
        target: "scheduler",
        primary_secs = cfg.primary.as_secs(),
        backup_secs = cfg.backup.as_secs(),
        sources = engine.source_count(),
        "scheduler started"
    );

    loop {
        let trigger = tokio::select! {
            _ = primary.tick(), if !stopped => Some(Trigger::Primary),
            _ = backup.tick(), if !stopped => Some(Trigger::Backup),
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Refresh) if !stopped => Some(Trigger::Manual),
                Some(Command::Refresh) => None,
                Some(Command::Stop) => {
                    if !stopped {
                        stopped = true;
                        if in_flight.is_none() {
                            phase_tx.send_replace(Phase::Stopped);
                        }
                        tracing::info!(target: "scheduler", in_flight = in_flight.is_some(), "scheduler stopped");
                    }
                    None
                }
                Some(Command::Start) => {
                    if stopped {
                        stopped = false;
                        (primary, backup) = timers(&cfg);
                        if in_flight.is_none() {
                            phase_tx.send_replace(Phase::Idle);
                        }
                        tracing::info!(target: "scheduler", "scheduler restarted");
                    }
                    None
                }
                None => break,
            },
            res = join_in_flight(&mut in_flight) => {
                in_flight = None;
                if let Err(e) = res {
                    tracing::warn!(target: "scheduler", error = %e, "cycle task failed");
                }
                cycles_tx.send_modify(|c| *c += 1);
                phase_tx.send_replace(if stopped { Phase::Stopped } else { Phase::Idle });
                None
            }
        };

        let Some(trigger) = trigger else {
            continue;
        };
        if in_flight.is_some() {
            tracing::debug!(target: "scheduler", ?trigger, "cycle in flight, trigger dropped");
            counter!("moves_cycle_dropped_total").increment(1);
            continue;
        }

        tracing::debug!(target: "scheduler", ?trigger, "starting cycle");
        // Mark busy before spawning so a trigger racing the task start is dropped too.
        phase_tx.send_replace(Phase::Fetching);
        let engine = Arc::clone(&engine);
        let phase_tx = Arc::clone(&phase_tx);
        in_flight = Some(tokio::spawn(async move { engine.run_cycle(&phase_tx).await }));
    }

    // All handles gone: let the last cycle land, then exit.
    if let Some(h) = in_flight.take() {
        let _ = h.await;
    }
    tracing::info!(target: "scheduler", "scheduler loop exited");
}
