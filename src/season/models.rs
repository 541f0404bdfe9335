use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Rating every player starts a season with
pub const START_ELO: i32 = 1000;

/// Database model for season_participants table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SeasonParticipant {
    pub id: i64,
    pub season_name: String,
    pub player_id: String, // External id of the player
    pub elo: i32,
    pub games_played: i32,
    pub created_at: DateTime<Utc>,
}

/// Applies `elo_change` to `previous`, never going below zero
pub fn floored_elo(previous: i32, elo_change: i32) -> i32 {
    previous.saturating_add(elo_change).max(0)
}
