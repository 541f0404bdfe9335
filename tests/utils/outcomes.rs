use chrono::{Duration, Utc};

use ladder::{FanFactionSetting, GameOutcome, PlayerResult};

// ============================================================================
// Game Outcome Builders
// ============================================================================

pub struct OutcomeBuilder {
    outcome: GameOutcome,
}

impl OutcomeBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            outcome: GameOutcome {
                id: id.to_string(),
                players: Vec::new(),
                fan_faction_setting: FanFactionSetting::On,
                creation_time: Utc::now() - Duration::hours(2),
            },
        }
    }

    /// A, B, C and D scoring 100, 200, 300 and 400
    pub fn four_player_game(id: &str) -> Self {
        Self::new(id)
            .with_player("A", 100)
            .with_player("B", 200)
            .with_player("C", 300)
            .with_player("D", 400)
    }

    pub fn with_player(mut self, name: &str, score: i32) -> Self {
        self.outcome.players.push(PlayerResult::new(name, score));
        self
    }

    pub fn with_setting(mut self, setting: FanFactionSetting) -> Self {
        self.outcome.fan_faction_setting = setting;
        self
    }

    pub fn played_days_ago(mut self, days: i64) -> Self {
        self.outcome.creation_time = Utc::now() - Duration::days(days);
        self
    }

    pub fn build(self) -> GameOutcome {
        self.outcome
    }
}
