use serde::{Deserialize, Serialize};

/// One line of a registered game's result, as shown to the community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub name: String,
    pub player_id: String,
    pub score: i32,
    pub elo_before: i32,
    pub elo_change: i32,
}

#[derive(Debug, Deserialize)]
pub struct RegisterGameRequest {
    /// Table id or table URL on Board Game Arena
    pub reference: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterGameResponse {
    pub message: String,
}
