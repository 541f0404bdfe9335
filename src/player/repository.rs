use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::Player;
use crate::database::{map_sqlx_error, MemoryDatabase};
use crate::shared::AppError;

const STILL_REFERENCED: &str = "player is still referenced by season ratings or games";

/// Trait for player registry operations
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn get_player(&self, name: &str) -> Result<Option<Player>, AppError>;
    async fn get_player_by_external_id(&self, external_id: &str)
        -> Result<Option<Player>, AppError>;
    /// All players ordered by name, case-insensitively
    async fn get_players(&self) -> Result<Vec<Player>, AppError>;
    async fn insert_player(&self, name: &str, external_id: &str) -> Result<Player, AppError>;
    async fn delete_player(&self, name: &str) -> Result<(), AppError>;
}

/// In-memory implementation of PlayerRepository for development and testing
pub struct InMemoryPlayerRepository {
    db: Arc<MemoryDatabase>,
}

impl InMemoryPlayerRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self))]
    async fn get_player(&self, name: &str) -> Result<Option<Player>, AppError> {
        let tables = self.db.tables();
        let player = tables.players.iter().find(|p| p.name == name).cloned();
        debug!(name = %name, found = player.is_some(), "Fetched player from memory");
        Ok(player)
    }

    #[instrument(skip(self))]
    async fn get_player_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Player>, AppError> {
        let tables = self.db.tables();
        Ok(tables
            .players
            .iter()
            .find(|p| p.external_id == external_id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn get_players(&self) -> Result<Vec<Player>, AppError> {
        let mut players = self.db.tables().players.clone();
        players.sort_by_key(|p| p.name.to_lowercase());
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn insert_player(&self, name: &str, external_id: &str) -> Result<Player, AppError> {
        debug!(name = %name, external_id = %external_id, "Inserting player in memory");

        self.db.transaction(|tables| {
            if tables
                .players
                .iter()
                .any(|p| p.name == name || p.external_id == external_id)
            {
                warn!(name = %name, external_id = %external_id, "Player already exists in memory");
                return Err(AppError::AlreadyRegistered(format!(
                    "player {name} ({external_id}) is already registered"
                )));
            }

            let player = Player {
                id: tables.next_id(),
                name: name.to_string(),
                external_id: external_id.to_string(),
                created_at: Utc::now(),
            };
            tables.players.push(player.clone());
            Ok(player)
        })
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, name: &str) -> Result<(), AppError> {
        self.db.transaction(|tables| {
            let position = tables
                .players
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| AppError::NotFound(format!("player {name}")))?;

            let external_id = &tables.players[position].external_id;
            let referenced = tables
                .season_participants
                .iter()
                .any(|p| &p.player_id == external_id)
                || tables
                    .game_participants
                    .iter()
                    .any(|p| &p.player_id == external_id);
            if referenced {
                return Err(AppError::ReferenceNotFound(STILL_REFERENCED.to_string()));
            }

            tables.players.remove(position);
            debug!(name = %name, "Player deleted from memory");
            Ok(())
        })
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self))]
    async fn get_player(&self, name: &str) -> Result<Option<Player>, AppError> {
        sqlx::query_as::<_, Player>(
            "SELECT id, name, external_id, created_at FROM players WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, name = %name, "Failed to fetch player from database");
            AppError::StorageFault(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_player_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Player>, AppError> {
        sqlx::query_as::<_, Player>(
            "SELECT id, name, external_id, created_at FROM players WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, external_id = %external_id, "Failed to fetch player from database");
            AppError::StorageFault(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_players(&self) -> Result<Vec<Player>, AppError> {
        sqlx::query_as::<_, Player>(
            "SELECT id, name, external_id, created_at FROM players ORDER BY LOWER(name), id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list players from database");
            AppError::StorageFault(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn insert_player(&self, name: &str, external_id: &str) -> Result<Player, AppError> {
        debug!(name = %name, external_id = %external_id, "Inserting player in database");

        let player = sqlx::query_as::<_, Player>(
            "INSERT INTO players (name, external_id) VALUES ($1, $2) \
             RETURNING id, name, external_id, created_at",
        )
        .bind(name)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, name = %name, "Failed to insert player in database");
            map_sqlx_error(
                e,
                &format!("player {name} ({external_id}) is already registered"),
                STILL_REFERENCED,
            )
        })?;

        debug!(player_id = player.id, "Player inserted in database");
        Ok(player)
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM players WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %name, "Failed to delete player from database");
                map_sqlx_error(e, STILL_REFERENCED, STILL_REFERENCED)
            })?;

        if result.rows_affected() == 0 {
            warn!(name = %name, "Player not found for deletion");
            return Err(AppError::NotFound(format!("player {name}")));
        }

        Ok(())
    }
}
