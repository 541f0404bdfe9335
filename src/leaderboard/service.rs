use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::models::{Leaderboard, LeaderboardEntry};
use crate::player::PlayerRepository;
use crate::season::SeasonRepository;
use crate::shared::AppError;

pub struct LeaderboardService {
    seasons: Arc<dyn SeasonRepository>,
    players: Arc<dyn PlayerRepository>,
}

impl LeaderboardService {
    pub fn new(seasons: Arc<dyn SeasonRepository>, players: Arc<dyn PlayerRepository>) -> Self {
        Self { seasons, players }
    }

    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self) -> Result<Leaderboard, AppError> {
        let mut participants = self.seasons.get_all().await?;
        let names: HashMap<String, String> = self
            .players
            .get_players()
            .await?
            .into_iter()
            .map(|p| (p.external_id, p.name))
            .collect();

        participants.sort_by(|a, b| b.elo.cmp(&a.elo));

        let entries: Vec<LeaderboardEntry> = participants
            .into_iter()
            .map(|p| LeaderboardEntry {
                player_name: names.get(&p.player_id).cloned().unwrap_or_default(),
                player_id: p.player_id,
                elo: p.elo,
                games_played: p.games_played,
            })
            .collect();

        debug!(entry_count = entries.len(), "Leaderboard built");
        Ok(Leaderboard {
            season: self.seasons.season_name().to_string(),
            entries,
        })
    }
}
