use serde::{Deserialize, Serialize};

/// JWT claims identifying the chat member behind a request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallerClaims {
    pub caller_id: String,
    pub display_name: String,
    /// Moderators may add players and skip the command cooldown
    #[serde(default)]
    pub privileged: bool,
    pub exp: usize,
    pub iat: usize,
}
