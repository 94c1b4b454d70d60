// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod extract;
pub mod hub;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod resolve;
pub mod scheduler;
pub mod store;
pub mod teams;

#[cfg(test)]
mod test_support;

pub use crate::api::{router, AppState};
pub use crate::engine::{Engine, EngineSettings, Phase};
pub use crate::hub::{BroadcastHub, ClientMessage, ServerMessage};
pub use crate::model::{MoveEvent, MoveType};
pub use crate::scheduler::{spawn_scheduler, SchedulerCfg, SchedulerHandle};
pub use crate::store::EventStore;
