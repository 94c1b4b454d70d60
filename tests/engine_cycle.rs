// tests/engine_cycle.rs
//
// Full fetch -> classify -> merge -> broadcast cycles against fixture feeds.
//
// Covered:
// - first cycle admits every recognised move, second identical cycle admits nothing
// - a newer report from another source supersedes the stored move
// - one failing or hanging source does not hold up the others

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use nba_moves_realtime::ingest::providers::rss::RssProvider;
use nba_moves_realtime::ingest::types::{FetchError, RawItem, SourceDescriptor, SourceProvider};
use nba_moves_realtime::{BroadcastHub, Engine, EngineSettings, EventStore, MoveType, Phase, ServerMessage};

const WIRE_XML: &str = include_str!("fixtures/moves_rss.xml");
const LATE_XML: &str = include_str!("fixtures/moves_rss_late.xml");

fn source(name: &str, confidence: u8) -> SourceDescriptor {
    SourceDescriptor {
        name: name.into(),
        url: format!("http://{name}.test/rss"),
        reporter: format!("{name} desk"),
        confidence,
    }
}

struct Broken(SourceDescriptor);

#[async_trait]
impl SourceProvider for Broken {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>, FetchError> {
        Err(FetchError::Status(503))
    }
    fn source(&self) -> &SourceDescriptor {
        &self.0
    }
}

struct Hangs(SourceDescriptor);

#[async_trait]
impl SourceProvider for Hangs {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>, FetchError> {
        std::future::pending().await
    }
    fn source(&self) -> &SourceDescriptor {
        &self.0
    }
}

fn engine(providers: Vec<Arc<dyn SourceProvider>>) -> (Arc<EventStore>, Arc<BroadcastHub>, Engine) {
    let store = Arc::new(EventStore::with_capacity(50));
    let hub = Arc::new(BroadcastHub::new(Arc::clone(&store)));
    let engine = Engine::new(
        providers,
        EngineSettings {
            source_timeout: Duration::from_secs(5),
            official_threshold: 90,
        },
        Arc::clone(&store),
        Arc::clone(&hub),
    );
    (store, hub, engine)
}

#[tokio::test]
async fn second_identical_cycle_admits_nothing() {
    let wire = RssProvider::from_fixture(source("wire", 95), WIRE_XML);
    let (store, hub, engine) = engine(vec![Arc::new(wire)]);
    let (phase, _phase_rx) = watch::channel(Phase::Idle);
    let mut sub = hub.subscribe();
    assert_eq!(sub.rx.recv().await.unwrap(), ServerMessage::CurrentSnapshot(vec![]));

    let first = engine.run_cycle(&phase).await;
    assert_eq!(first.sources_ok, 1);
    assert_eq!(first.items, 4, "undated item is skipped at parse time");
    assert_eq!(first.admitted.len(), 3, "weather headline is not a move");
    assert_eq!(store.len(), 3);

    let newest = &first.admitted[0];
    assert_eq!(newest.player.name, "Jordan Clark");
    assert_eq!(newest.move_type, MoveType::Trade);
    assert_eq!(newest.to_team.as_ref().unwrap().abbreviation, "LAL");
    assert!(newest.is_official);
    assert_eq!(newest.date, "2025-06-16");

    let waiver = first.admitted.iter().find(|e| e.move_type == MoveType::Waiver).unwrap();
    assert_eq!(waiver.player.name, "Devin Cole");
    assert_eq!(waiver.to_team.as_ref().unwrap().abbreviation, "CHA");

    match sub.rx.recv().await.unwrap() {
        ServerMessage::NewEvents(v) => assert_eq!(v.len(), 3),
        other => panic!("expected new-events, got {other:?}"),
    }
    assert!(matches!(sub.rx.recv().await.unwrap(), ServerMessage::CurrentSnapshot(v) if v.len() == 3));

    let second = engine.run_cycle(&phase).await;
    assert!(second.admitted.is_empty());
    assert_eq!(store.len(), 3);
    assert!(sub.rx.try_recv().is_err(), "no frames for an empty delta");
    assert_eq!(*phase.borrow(), Phase::Broadcasting);
}

#[tokio::test]
async fn newer_report_supersedes_stored_move() {
    let wire = RssProvider::from_fixture(source("wire", 95), WIRE_XML);
    let late = RssProvider::from_fixture(source("late", 70), LATE_XML);
    let (store, _hub, engine) = engine(vec![Arc::new(wire), Arc::new(late)]);
    let (phase, _rx) = watch::channel(Phase::Idle);

    let report = engine.run_cycle(&phase).await;
    // Reed collapses to the 19:00 report; Moss is new.
    assert_eq!(report.admitted.len(), 4);

    let snap = store.snapshot();
    let reeds: Vec<_> = snap.iter().filter(|e| e.player.name == "Marcus Reed").collect();
    assert_eq!(reeds.len(), 1);
    assert_eq!(reeds[0].source, "late desk");
    assert!(!reeds[0].is_official);
    assert_eq!(snap[0].player.name, "Marcus Reed", "newest first");
    assert!(snap.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[tokio::test]
async fn failing_source_is_isolated() {
    let wire = RssProvider::from_fixture(source("wire", 95), WIRE_XML);
    let (store, _hub, engine) = engine(vec![Arc::new(Broken(source("down", 80))), Arc::new(wire)]);
    let (phase, _rx) = watch::channel(Phase::Idle);

    let report = engine.run_cycle(&phase).await;
    assert_eq!(report.sources_ok, 1);
    assert_eq!(report.sources_failed, 1);
    assert_eq!(store.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn hanging_source_times_out_and_cycle_completes() {
    let wire = RssProvider::from_fixture(source("wire", 95), WIRE_XML);
    let (store, _hub, engine) = engine(vec![Arc::new(Hangs(source("slow", 80))), Arc::new(wire)]);
    let (phase, _rx) = watch::channel(Phase::Idle);

    let report = engine.run_cycle(&phase).await;
    assert_eq!(report.sources_failed, 1);
    assert_eq!(report.admitted.len(), 3);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn no_sources_is_an_empty_cycle() {
    let (store, _hub, engine) = engine(vec![]);
    let (phase, _rx) = watch::channel(Phase::Idle);
    let report = engine.run_cycle(&phase).await;
    assert_eq!(report.sources_ok + report.sources_failed, 0);
    assert!(store.is_empty());
}
