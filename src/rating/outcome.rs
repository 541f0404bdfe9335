use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::shared::AppError;

/// Final score of one competitor as reported by the game platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerResult {
    pub name: String,
    pub score: i32,
}

impl PlayerResult {
    pub fn new(name: &str, score: i32) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }
}

/// Fan faction option of a Terra Mystica table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum FanFactionSetting {
    #[strum(serialize = "Off")]
    #[serde(rename = "Off")]
    Off,
    #[strum(serialize = "On - with Fire & Ice")]
    #[serde(rename = "On - with Fire & Ice")]
    On,
    #[strum(serialize = "On - no Fire & Ice")]
    #[serde(rename = "On - no Fire & Ice")]
    OnNoFireAndIce,
    #[default]
    Unknown,
}

impl FanFactionSetting {
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::On | Self::OnNoFireAndIce)
    }
}

impl From<String> for FanFactionSetting {
    fn from(label: String) -> Self {
        Self::from_str(&label).unwrap_or_default()
    }
}

/// A finished game as read from the game platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameOutcome {
    pub id: String,
    pub players: Vec<PlayerResult>,
    #[serde(default)]
    pub fan_faction_setting: FanFactionSetting,
    pub creation_time: DateTime<Utc>,
}

impl GameOutcome {
    pub fn table_link(&self) -> String {
        format!("https://boardgamearena.com/table?table={}", self.id)
    }

    /// Checks the outcome can be rated: named players with positive scores,
    /// fan factions enabled and a game not older than `max_age`.
    pub fn validate(&self, max_age: Duration, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::InvalidOutcome("game has no id".to_string()));
        }

        let mut seen = HashSet::new();
        for (i, player) in self.players.iter().enumerate() {
            if player.name.is_empty() {
                return Err(AppError::InvalidOutcome(format!("player {i} has no name")));
            }
            if player.score <= 0 {
                return Err(AppError::InvalidOutcome(format!("player {i} has no score")));
            }
            if !seen.insert(player.name.as_str()) {
                return Err(AppError::InvalidOutcome(format!(
                    "player {} appears more than once",
                    player.name
                )));
            }
        }

        if !self.fan_faction_setting.is_enabled() {
            return Err(AppError::InvalidOutcome(
                "fan factions are not enabled".to_string(),
            ));
        }

        // A cutoff before the earliest representable time excludes nothing
        let too_old = now
            .checked_sub_signed(max_age)
            .is_some_and(|cutoff| self.creation_time < cutoff);
        if too_old {
            return Err(AppError::InvalidOutcome(format!(
                "game is too old (more than {} days)",
                max_age.num_days()
            )));
        }

        Ok(())
    }
}
