// src/test_support.rs
//! Builders shared by unit tests.

use chrono::{DateTime, Utc};

use crate::model::{item_key, MoveEvent, MoveType, PlayerStub};
use crate::pipeline::event_id;

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000 + secs, 0).unwrap()
}

pub(crate) fn move_of(player: &str, move_type: MoveType, secs: i64) -> MoveEvent {
    let timestamp = ts(secs);
    MoveEvent {
        id: event_id(&item_key(player, move_type, timestamp)),
        player: PlayerStub::from_name(player),
        from_team: None,
        to_team: None,
        move_type,
        date: timestamp.format("%Y-%m-%d").to_string(),
        timestamp,
        details: format!("{player} {move_type}"),
        source: "Test Desk".into(),
        is_official: false,
        trade_assets: None,
        salary_cap_impact: None,
        contract: None,
    }
}

/// A signing by `player`, `secs` after a fixed epoch.
pub(crate) fn move_at(player: &str, secs: i64) -> MoveEvent {
    move_of(player, MoveType::Signing, secs)
}
