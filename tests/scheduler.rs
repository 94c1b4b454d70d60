// tests/scheduler.rs
//
// Scheduler state machine under a paused clock.
//
// Covered:
// - primary tick fires immediately on start
// - triggers arriving mid-cycle are dropped, not queued
// - backup tick fires on its own cadence
// - stop lets nothing new start; start resets timers and ticks right away

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nba_moves_realtime::ingest::types::{FetchError, RawItem, SourceDescriptor, SourceProvider};
use nba_moves_realtime::{
    spawn_scheduler, BroadcastHub, Engine, EngineSettings, EventStore, Phase, SchedulerCfg, SchedulerHandle,
};

struct Counting {
    src: SourceDescriptor,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

#[async_trait]
impl SourceProvider for Counting {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(vec![])
    }
    fn source(&self) -> &SourceDescriptor {
        &self.src
    }
}

fn start(delay: Duration, primary: u64, backup: u64) -> (SchedulerHandle, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Counting {
        src: SourceDescriptor {
            name: "count".into(),
            url: "http://count.test/rss".into(),
            reporter: "Counter".into(),
            confidence: 50,
        },
        calls: Arc::clone(&calls),
        delay,
    };
    let store = Arc::new(EventStore::with_capacity(50));
    let hub = Arc::new(BroadcastHub::new(Arc::clone(&store)));
    let engine = Arc::new(Engine::new(
        vec![Arc::new(provider)],
        EngineSettings {
            source_timeout: Duration::from_secs(60),
            official_threshold: 90,
        },
        store,
        hub,
    ));
    let (handle, _task) = spawn_scheduler(
        engine,
        SchedulerCfg {
            primary: Duration::from_secs(primary),
            backup: Duration::from_secs(backup),
        },
    );
    (handle, calls)
}

async fn wait_phase(h: &SchedulerHandle, want: impl Fn(Phase) -> bool) {
    let mut rx = h.watch_phase();
    rx.wait_for(|p| want(*p)).await.expect("scheduler alive");
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately() {
    let (h, calls) = start(Duration::ZERO, 30, 120);
    h.wait_for_cycles(1).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    wait_phase(&h, |p| p == Phase::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn refresh_during_cycle_is_dropped() {
    let (h, calls) = start(Duration::from_secs(10), 30, 120);
    wait_phase(&h, Phase::is_busy).await;

    assert!(h.refresh());
    assert!(h.refresh());
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(h.cycles_completed(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "mid-cycle refreshes must not queue");

    // Idle now: a refresh runs right away without touching the primary timer.
    assert!(h.refresh());
    h.wait_for_cycles(2).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn primary_keeps_ticking() {
    let (h, calls) = start(Duration::ZERO, 30, 1_000);
    h.wait_for_cycles(1).await;
    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn backup_tick_fires_on_its_own() {
    let (h, calls) = start(Duration::ZERO, 1_000, 120);
    h.wait_for_cycles(1).await;
    tokio::time::sleep(Duration::from_secs(119)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_and_restart() {
    let (h, calls) = start(Duration::ZERO, 30, 120);
    h.wait_for_cycles(1).await;

    assert!(h.stop());
    wait_phase(&h, |p| p == Phase::Stopped).await;
    assert!(h.refresh(), "command accepted");
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1, "nothing runs while stopped");
    assert_eq!(h.phase(), Phase::Stopped);

    assert!(h.start());
    h.wait_for_cycles(2).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    wait_phase(&h, |p| p == Phase::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn stop_mid_cycle_lets_it_finish() {
    let (h, calls) = start(Duration::from_secs(10), 30, 120);
    wait_phase(&h, Phase::is_busy).await;

    assert!(h.stop());
    h.wait_for_cycles(1).await;
    wait_phase(&h, |p| p == Phase::Stopped).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
