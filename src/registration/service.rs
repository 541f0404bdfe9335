use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use super::ledger::RegistrationLedger;
use super::types::RankedResult;
use crate::database::Repositories;
use crate::game::models::NewGameParticipant;
use crate::game::repository::{already_registered, GameRepository};
use crate::player::{Player, PlayerRepository};
use crate::rating::{GameOutcome, RatingEngine};
use crate::season::{SeasonRepository, START_ELO};
use crate::shared::AppError;

/// Rates finished games and records them for the current season
pub struct GameRegistrationService {
    players: Arc<dyn PlayerRepository>,
    seasons: Arc<dyn SeasonRepository>,
    games: Arc<dyn GameRepository>,
    ledger: Arc<dyn RegistrationLedger>,
    engine: RatingEngine,
    max_game_age: Duration,
    // Held from the duplicate check until the commit so rating snapshots stay consistent
    registration_lock: AsyncMutex<()>,
}

impl GameRegistrationService {
    pub fn new(repositories: &Repositories, engine: RatingEngine, max_game_age: Duration) -> Self {
        Self {
            players: Arc::clone(&repositories.players),
            seasons: Arc::clone(&repositories.seasons),
            games: Arc::clone(&repositories.games),
            ledger: Arc::clone(&repositories.ledger),
            engine,
            max_game_age,
            registration_lock: AsyncMutex::new(()),
        }
    }

    pub async fn register_game(&self, outcome: &GameOutcome) -> Result<Vec<RankedResult>, AppError> {
        self.register_game_at(outcome, Utc::now()).await
    }

    /// Registers `outcome` as if it were `now`. Returns the results ordered by elo change, best first.
    #[instrument(skip(self, outcome, now), fields(bga_id = %outcome.id))]
    pub async fn register_game_at(
        &self,
        outcome: &GameOutcome,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedResult>, AppError> {
        outcome.validate(self.max_game_age, now)?;

        let _guard = self.registration_lock.lock().await;

        match self.games.get_game_with_participants(&outcome.id).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                info!("Game is already registered");
                return Err(already_registered(&outcome.id));
            }
            Err(e) => {
                warn!(error = %e, "Could not check whether game is registered");
                return Err(e);
            }
        }

        let registered = self.registered_players(outcome).await?;
        if registered.len() < 2 {
            info!(registered = registered.len(), "Not enough registered players");
            return Err(AppError::InsufficientPlayers {
                registered: registered.len(),
            });
        }

        let current_ratings = self.current_ratings(&registered).await?;
        let changes = self.engine.elo_changes(&outcome.players, &current_ratings);

        let scores: HashMap<&str, i32> = outcome
            .players
            .iter()
            .map(|p| (p.name.as_str(), p.score))
            .collect();

        let mut results = Vec::with_capacity(changes.len());
        let mut participants = Vec::with_capacity(changes.len());
        for change in changes {
            let (Some(player), Some(&score), Some(&elo_before)) = (
                registered.get(&change.name),
                scores.get(change.name.as_str()),
                current_ratings.get(&change.name),
            ) else {
                continue;
            };

            participants.push(NewGameParticipant {
                player_id: player.external_id.clone(),
                score,
                elo_change: change.delta,
                elo_before,
            });
            results.push(RankedResult {
                name: player.name.clone(),
                player_id: player.external_id.clone(),
                score,
                elo_before,
                elo_change: change.delta,
            });
        }

        let committed = self
            .ledger
            .commit_registration(&outcome.id, &participants)
            .await?;

        // Stable: ties keep the order players appear in the outcome
        results.sort_by(|a, b| b.elo_change.cmp(&a.elo_change));

        info!(
            game_id = committed.game.game.id,
            participant_count = results.len(),
            "Game registered"
        );
        Ok(results)
    }

    async fn registered_players(
        &self,
        outcome: &GameOutcome,
    ) -> Result<HashMap<String, Player>, AppError> {
        let mut registered = HashMap::new();
        for result in &outcome.players {
            match self.players.get_player(&result.name).await? {
                Some(player) => {
                    registered.insert(result.name.clone(), player);
                }
                None => debug!(name = %result.name, "Skipping unregistered player"),
            }
        }
        Ok(registered)
    }

    /// Current rating of each registered player by outcome name. Unrated players start at `START_ELO`.
    async fn current_ratings(
        &self,
        registered: &HashMap<String, Player>,
    ) -> Result<HashMap<String, i32>, AppError> {
        let mut ratings = HashMap::with_capacity(registered.len());
        for (name, player) in registered {
            let elo = self
                .seasons
                .get_participant(&player.external_id)
                .await?
                .map_or(START_ELO, |p| p.elo);
            ratings.insert(name.clone(), elo);
        }
        Ok(ratings)
    }
}
