// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static description of one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,     // e.g., "shams"
    pub url: String,      // feed endpoint
    pub reporter: String, // attribution shown to subscribers
    pub confidence: u8,   // 0..=100
}

/// One feed item after boundary validation: title + publish time are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub summary: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed feed: {0}")]
    Malformed(String),
    #[error("fetch task failed: {0}")]
    TaskFailed(String),
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>, FetchError>;
    fn source(&self) -> &SourceDescriptor;
}
