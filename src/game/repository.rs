use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{Game, GameParticipant, GameWithParticipants, NewGameParticipant};
use crate::database::{map_sqlx_error, MemoryDatabase, Tables, MISSING_REFERENCE};
use crate::shared::AppError;

pub(crate) fn already_registered(bga_id: &str) -> AppError {
    AppError::AlreadyRegistered(format!("game {bga_id} is already registered"))
}

/// Trait for the games of the current season
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Looks up a game of the current season. `Ok(None)` means it has not been registered.
    async fn get_game_with_participants(
        &self,
        bga_id: &str,
    ) -> Result<Option<GameWithParticipants>, AppError>;

    /// Stores a game and its participants in one transaction
    async fn create_game_with_participants(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<GameWithParticipants, AppError>;

    /// Games of the current season, newest first
    async fn list_games(&self) -> Result<Vec<Game>, AppError>;
}

impl Tables {
    pub(crate) fn insert_game_with_participants(
        &mut self,
        season: &str,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<GameWithParticipants, AppError> {
        if !self.has_season(season) {
            return Err(AppError::ReferenceNotFound(MISSING_REFERENCE.to_string()));
        }
        if self
            .games
            .iter()
            .any(|g| g.bga_id == bga_id && g.season_name == season)
        {
            return Err(already_registered(bga_id));
        }

        let game = Game {
            id: self.next_id(),
            bga_id: bga_id.to_string(),
            season_name: season.to_string(),
            created_at: Utc::now(),
        };

        let mut stored = Vec::with_capacity(participants.len());
        for participant in participants {
            if !self.has_player(&participant.player_id) {
                return Err(AppError::ReferenceNotFound(MISSING_REFERENCE.to_string()));
            }
            if participant.score <= 0 {
                return Err(AppError::InvalidOutcome(format!(
                    "score of player {} must be positive",
                    participant.player_id
                )));
            }
            if stored
                .iter()
                .any(|p: &GameParticipant| p.player_id == participant.player_id)
            {
                return Err(AppError::InvalidOutcome(format!(
                    "player {} appears twice in game {bga_id}",
                    participant.player_id
                )));
            }
            stored.push(GameParticipant {
                id: self.next_id(),
                game_id: game.id,
                player_id: participant.player_id.clone(),
                score: participant.score,
                elo_change: participant.elo_change,
                elo_before: participant.elo_before,
                created_at: game.created_at,
            });
        }

        self.games.push(game.clone());
        self.game_participants.extend(stored.iter().cloned());
        Ok(GameWithParticipants {
            game,
            participants: stored,
        })
    }
}

/// In-memory implementation of GameRepository for development and testing
pub struct InMemoryGameRepository {
    db: Arc<MemoryDatabase>,
    season: String,
}

impl InMemoryGameRepository {
    pub fn new(db: Arc<MemoryDatabase>, season: &str) -> Self {
        Self {
            db,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_game_with_participants(
        &self,
        bga_id: &str,
    ) -> Result<Option<GameWithParticipants>, AppError> {
        let tables = self.db.tables();
        let Some(game) = tables
            .games
            .iter()
            .find(|g| g.bga_id == bga_id && g.season_name == self.season)
            .cloned()
        else {
            debug!(bga_id = %bga_id, "Game not found in memory");
            return Ok(None);
        };

        let participants = tables
            .game_participants
            .iter()
            .filter(|p| p.game_id == game.id)
            .cloned()
            .collect();
        Ok(Some(GameWithParticipants { game, participants }))
    }

    #[instrument(skip(self, participants), fields(season = %self.season))]
    async fn create_game_with_participants(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<GameWithParticipants, AppError> {
        let created = self.db.transaction(|tables| {
            tables.insert_game_with_participants(&self.season, bga_id, participants)
        })?;
        debug!(
            game_id = created.game.id,
            participant_count = created.participants.len(),
            "Game stored in memory"
        );
        Ok(created)
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        let mut games: Vec<Game> = self
            .db
            .tables()
            .games
            .iter()
            .filter(|g| g.season_name == self.season)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(games)
    }
}

/// Inserts the game row and its participants on an open connection or transaction.
pub(crate) async fn insert_game_rows(
    conn: &mut PgConnection,
    season: &str,
    bga_id: &str,
    participants: &[NewGameParticipant],
) -> Result<GameWithParticipants, AppError> {
    let game = sqlx::query_as::<_, Game>(
        "INSERT INTO games (bga_id, season_name) VALUES ($1, $2) \
         RETURNING id, bga_id, season_name, created_at",
    )
    .bind(bga_id)
    .bind(season)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        warn!(error = %e, bga_id = %bga_id, "Failed to insert game");
        map_sqlx_error(e, &already_registered(bga_id).to_string(), MISSING_REFERENCE)
    })?;

    let mut stored = Vec::with_capacity(participants.len());
    for participant in participants {
        let row = sqlx::query_as::<_, GameParticipant>(
            "INSERT INTO game_participants (game_id, player_id, score, elo_change, elo_before) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, game_id, player_id, score, elo_change, elo_before, created_at",
        )
        .bind(game.id)
        .bind(&participant.player_id)
        .bind(participant.score)
        .bind(participant.elo_change)
        .bind(participant.elo_before)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            warn!(
                error = %e,
                player_id = %participant.player_id,
                "Failed to insert game participant"
            );
            map_sqlx_error(
                e,
                &format!(
                    "player {} appears twice in game {bga_id}",
                    participant.player_id
                ),
                MISSING_REFERENCE,
            )
        })?;
        stored.push(row);
    }

    Ok(GameWithParticipants {
        game,
        participants: stored,
    })
}

/// PostgreSQL implementation of game repository
pub struct PostgresGameRepository {
    pool: PgPool,
    season: String,
}

impl PostgresGameRepository {
    pub fn new(pool: PgPool, season: &str) -> Self {
        Self {
            pool,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl GameRepository for PostgresGameRepository {
    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_game_with_participants(
        &self,
        bga_id: &str,
    ) -> Result<Option<GameWithParticipants>, AppError> {
        let game = sqlx::query_as::<_, Game>(
            "SELECT id, bga_id, season_name, created_at FROM games \
             WHERE bga_id = $1 AND season_name = $2",
        )
        .bind(bga_id)
        .bind(&self.season)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, bga_id = %bga_id, "Failed to fetch game from database");
            AppError::StorageFault(e.to_string())
        })?;

        let Some(game) = game else {
            debug!(bga_id = %bga_id, "Game not found in database");
            return Ok(None);
        };

        let participants = sqlx::query_as::<_, GameParticipant>(
            "SELECT id, game_id, player_id, score, elo_change, elo_before, created_at \
             FROM game_participants WHERE game_id = $1 ORDER BY id",
        )
        .bind(game.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, game_id = game.id, "Failed to fetch game participants");
            AppError::StorageFault(e.to_string())
        })?;

        Ok(Some(GameWithParticipants { game, participants }))
    }

    #[instrument(skip(self, participants), fields(season = %self.season))]
    async fn create_game_with_participants(
        &self,
        bga_id: &str,
        participants: &[NewGameParticipant],
    ) -> Result<GameWithParticipants, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin transaction");
            AppError::StorageFault(e.to_string())
        })?;

        let created = insert_game_rows(&mut tx, &self.season, bga_id, participants).await?;

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit game");
            AppError::StorageFault(e.to_string())
        })?;

        debug!(game_id = created.game.id, "Game stored in database");
        Ok(created)
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        sqlx::query_as::<_, Game>(
            "SELECT id, bga_id, season_name, created_at FROM games \
             WHERE season_name = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(&self.season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list games");
            AppError::StorageFault(e.to_string())
        })
    }
}
