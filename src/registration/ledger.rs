use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::database::{map_sqlx_error, MemoryDatabase, MISSING_REFERENCE};
use crate::game::models::{GameWithParticipants, NewGameParticipant};
use crate::game::repository::insert_game_rows;
use crate::season::models::SeasonParticipant;
use crate::season::repository::upsert_participant_row;
use crate::shared::AppError;

/// Everything a registration wrote
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredGame {
    pub game: GameWithParticipants,
    pub ratings: Vec<SeasonParticipant>,
}

/// Commits a rated game: the game rows and every season rating change, all or nothing.
#[async_trait]
pub trait RegistrationLedger: Send + Sync {
    async fn commit_registration(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<RegisteredGame, AppError>;
}

pub struct InMemoryRegistrationLedger {
    db: Arc<MemoryDatabase>,
    season: String,
}

impl InMemoryRegistrationLedger {
    pub fn new(db: Arc<MemoryDatabase>, season: &str) -> Self {
        Self {
            db,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl RegistrationLedger for InMemoryRegistrationLedger {
    #[instrument(skip(self, participants), fields(season = %self.season))]
    async fn commit_registration(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<RegisteredGame, AppError> {
        let registered = self.db.transaction(|tables| {
            let game = tables.insert_game_with_participants(&self.season, bga_id, participants)?;
            let ratings = participants
                .iter()
                .map(|p| tables.upsert_season_participant(&self.season, &p.player_id, p.elo_change))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RegisteredGame { game, ratings })
        })?;

        debug!(game_id = registered.game.game.id, "Registration committed in memory");
        Ok(registered)
    }
}

pub struct PostgresRegistrationLedger {
    pool: PgPool,
    season: String,
}

impl PostgresRegistrationLedger {
    pub fn new(pool: PgPool, season: &str) -> Self {
        Self {
            pool,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl RegistrationLedger for PostgresRegistrationLedger {
    #[instrument(skip(self, participants), fields(season = %self.season))]
    async fn commit_registration(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<RegisteredGame, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin registration transaction");
            AppError::StorageFault(e.to_string())
        })?;

        // Game row first: a duplicate registration fails before any rating moves.
        let game = insert_game_rows(&mut tx, &self.season, bga_id, participants).await?;

        let mut ratings = Vec::with_capacity(participants.len());
        for participant in participants {
            let rating = upsert_participant_row(
                &mut *tx,
                &self.season,
                &participant.player_id,
                participant.elo_change,
            )
            .await
            .map_err(|e| {
                warn!(
                    error = %e,
                    player_id = %participant.player_id,
                    "Failed to update season rating"
                );
                map_sqlx_error(e, MISSING_REFERENCE, MISSING_REFERENCE)
            })?;
            ratings.push(rating);
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit registration");
            AppError::StorageFault(e.to_string())
        })?;

        debug!(game_id = game.game.id, "Registration committed in database");
        Ok(RegisteredGame { game, ratings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::repository::{InMemoryPlayerRepository, PlayerRepository};

    const SEASON: &str = "First Fan Faction Season";

    fn participant(player_id: &str, elo_change: i32) -> NewGameParticipant {
        NewGameParticipant {
            player_id: player_id.to_string(),
            score: 100,
            elo_change,
            elo_before: 1000,
        }
    }

    async fn setup() -> (Arc<MemoryDatabase>, InMemoryRegistrationLedger) {
        let db = Arc::new(MemoryDatabase::new());
        db.tables().seasons.push(SEASON.to_string());
        let players = InMemoryPlayerRepository::new(Arc::clone(&db));
        players.insert_player("Alice", "1").await.unwrap();
        players.insert_player("Bob", "2").await.unwrap();
        (Arc::clone(&db), InMemoryRegistrationLedger::new(db, SEASON))
    }

    #[tokio::test]
    async fn test_commit_writes_game_and_ratings() {
        let (db, ledger) = setup().await;

        let registered = ledger
            .commit_registration("77", &[participant("1", 11), participant("2", -11)])
            .await
            .unwrap();

        assert_eq!(registered.game.participants.len(), 2);
        assert_eq!(registered.ratings[0].elo, 1011);
        assert_eq!(registered.ratings[1].elo, 989);
        assert_eq!(db.tables().season_participants.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_player_writes_nothing() {
        let (db, ledger) = setup().await;

        let result = ledger
            .commit_registration("77", &[participant("1", 11), participant("3", -11)])
            .await;

        assert!(matches!(result, Err(AppError::ReferenceNotFound(_))));
        let tables = db.tables();
        assert!(tables.games.is_empty());
        assert!(tables.game_participants.is_empty());
        assert!(tables.season_participants.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_commit_leaves_ratings_untouched() {
        let (db, ledger) = setup().await;
        ledger
            .commit_registration("77", &[participant("1", 11), participant("2", -11)])
            .await
            .unwrap();

        let result = ledger
            .commit_registration("77", &[participant("1", 11), participant("2", -11)])
            .await;

        assert!(matches!(result, Err(AppError::AlreadyRegistered(_))));
        let tables = db.tables();
        assert!(tables.season_participants.iter().all(|p| p.games_played == 1));
        assert_eq!(tables.season_participants[0].elo, 1011);
    }
}
