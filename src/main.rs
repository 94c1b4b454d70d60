//! NBA moves feed: binary entrypoint.
//! Loads config, wires ingest -> engine -> scheduler -> hub, serves HTTP + WebSocket.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nba_moves_realtime::config::AppConfig;
use nba_moves_realtime::ingest::config::load_sources;
use nba_moves_realtime::ingest::providers::rss::RssProvider;
use nba_moves_realtime::ingest::types::SourceProvider;
use nba_moves_realtime::metrics::Metrics;
use nba_moves_realtime::{
    router, spawn_scheduler, AppState, BroadcastHub, Engine, EngineSettings, EventStore,
    SchedulerCfg,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nba_moves_realtime=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real env vars win.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env().context("reading configuration")?;
    init_tracing(cfg.json_logs);

    let sources = load_sources(cfg.sources_path.as_deref()).context("loading sources")?;
    let mut providers: Vec<Arc<dyn SourceProvider>> = Vec::with_capacity(sources.len());
    for src in sources {
        tracing::info!(source = %src.name, url = %src.url, confidence = src.confidence, "source registered");
        providers.push(Arc::new(RssProvider::http(src, cfg.source_timeout)?));
    }

    let metrics = Metrics::init()?;

    let store = Arc::new(EventStore::with_capacity(cfg.store_capacity));
    let hub = Arc::new(BroadcastHub::new(Arc::clone(&store)));
    let engine = Arc::new(Engine::new(
        providers,
        EngineSettings {
            source_timeout: cfg.source_timeout,
            official_threshold: cfg.official_threshold,
        },
        Arc::clone(&store),
        Arc::clone(&hub),
    ));
    let (scheduler, scheduler_task) = spawn_scheduler(
        engine,
        SchedulerCfg {
            primary: cfg.poll_interval,
            backup: cfg.backup_poll_interval,
        },
    );

    let app = router(AppState {
        store,
        hub,
        scheduler: scheduler.clone(),
    })
    .merge(metrics.router());

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    tracing::info!("shutting down");
    scheduler.stop();
    // Let an in-flight cycle land before the runtime goes away.
    let mut phase = scheduler.watch_phase();
    let grace = cfg.source_timeout + Duration::from_secs(5);
    if tokio::time::timeout(grace, phase.wait_for(|p| !p.is_busy()))
        .await
        .is_err()
    {
        tracing::warn!("cycle still running at shutdown");
    }
    scheduler_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }
}
