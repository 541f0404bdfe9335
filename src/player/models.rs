use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::Write;

/// Database model for players table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: i64,
    pub name: String,        // Human label, unique
    pub external_id: String, // Identifier on the game platform, unique
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Link to the player's profile on Board Game Arena
    pub fn profile_link(&self) -> String {
        format!(
            "https://boardgamearena.com/player?id={}",
            self.external_id
        )
    }
}

/// Renders the registered players roster as a fenced table
pub fn format_roster(players: &[Player]) -> String {
    let mut out = String::from("Players\n```\n");
    let _ = writeln!(out, "{:<20} {:<10} {:<20}", "Name", "ID", "Link");
    let _ = writeln!(
        out,
        "{:<20} {:<10} {:<20}",
        "-".repeat(20),
        "-".repeat(10),
        "-".repeat(20)
    );
    for player in players {
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:<20}",
            player.name,
            player.external_id,
            player.profile_link()
        );
    }
    out.push_str("```\n");
    out
}
