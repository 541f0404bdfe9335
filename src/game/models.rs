use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for games table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: i64,
    pub bga_id: String, // Table id on Board Game Arena
    pub season_name: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for game_participants table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct GameParticipant {
    pub id: i64,
    pub game_id: i64,
    pub player_id: String, // External id of the player
    pub score: i32,
    pub elo_change: i32,
    pub elo_before: i32,
    pub created_at: DateTime<Utc>,
}

/// A participation row that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewGameParticipant {
    pub player_id: String,
    pub score: i32,
    pub elo_change: i32,
    pub elo_before: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameWithParticipants {
    #[serde(flatten)]
    pub game: Game,
    pub participants: Vec<GameParticipant>,
}
