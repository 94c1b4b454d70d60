// src/model.rs
//! Wire/data model for detected player moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::teams::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    Trade,
    Signing,
    Waiver,
    Release,
    Draft,
    Other,
}

impl MoveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveType::Trade => "trade",
            MoveType::Signing => "signing",
            MoveType::Waiver => "waiver",
            MoveType::Release => "release",
            MoveType::Draft => "draft",
            MoveType::Other => "other",
        }
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player identity as far as feed text can tell: id + display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStub {
    pub id: String,
    pub name: String,
}

impl PlayerStub {
    /// `"Jordan Clark"` -> id `"jordan-clark"`.
    pub fn from_name(name: &str) -> Self {
        let id = name
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub value: f64,
    pub years: u32,
    pub guaranteed: f64,
    pub average_annual_value: f64,
    pub start_date: String,
    pub end_date: String,
}

/// One detected transaction report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub id: String,
    pub player: PlayerStub,
    pub from_team: Option<Team>,
    pub to_team: Option<Team>,
    pub move_type: MoveType,
    /// Publication date, `YYYY-MM-DD` (UTC).
    pub date: String,
    /// Publication time, serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub source: String,
    pub is_official: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_assets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_cap_impact: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
}

impl MoveEvent {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            player: self.player.name.clone(),
            move_type: self.move_type,
        }
    }

    /// Identity of one concrete report: player + move type + publication time.
    pub fn item_key(&self) -> String {
        item_key(&self.player.name, self.move_type, self.timestamp)
    }
}

pub(crate) fn item_key(player: &str, move_type: MoveType, ts: DateTime<Utc>) -> String {
    format!("{player}-{move_type}-{}", ts.to_rfc3339())
}

/// Merge key for "the same logical move".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub player: String,
    pub move_type: MoveType,
}
