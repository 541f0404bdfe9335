use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub player_name: String, // Empty when the player is no longer registered
    pub elo: i32,
    pub games_played: i32,
}

/// Ratings of the current season, highest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub season: String,
    pub entries: Vec<LeaderboardEntry>,
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Leaderboard")?;
        writeln!(f, "{:<20} {:>10} {:>15}", "Player Name", "Elo", "Games Played")?;
        writeln!(f, "{}", "-".repeat(47))?;
        for entry in &self.entries {
            writeln!(
                f,
                "{:<20} {:>10} {:>15}",
                entry.player_name, entry.elo, entry.games_played
            )?;
        }
        Ok(())
    }
}
