use serde::{Deserialize, Serialize};

/// Request payload for registering a player
#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
    pub external_id: String,
}

/// Response for player endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayerResponse {
    pub name: String,
    pub external_id: String,
    pub profile_link: String,
}

impl From<super::Player> for PlayerResponse {
    fn from(player: super::Player) -> Self {
        let profile_link = player.profile_link();
        Self {
            name: player.name,
            external_id: player.external_id,
            profile_link,
        }
    }
}
