use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{floored_elo, SeasonParticipant, START_ELO};
use crate::database::{map_sqlx_error, MemoryDatabase, Tables, MISSING_REFERENCE};
use crate::shared::AppError;

/// Ratings of the current season
#[async_trait]
pub trait SeasonRepository: Send + Sync {
    fn season_name(&self) -> &str;

    /// Creates the current season row if it does not exist yet
    async fn ensure_season(&self) -> Result<(), AppError>;

    /// All participants of the current season, highest elo first
    async fn get_all(&self) -> Result<Vec<SeasonParticipant>, AppError>;

    async fn get_participant(&self, player_id: &str)
        -> Result<Option<SeasonParticipant>, AppError>;

    /// Adds `elo_change` to the player's rating and counts one more game.
    ///
    /// A player without a row starts from `START_ELO`. The result never goes below 0.
    async fn upsert_season_participant(
        &self,
        player_id: &str,
        elo_change: i32,
    ) -> Result<SeasonParticipant, AppError>;
}

impl Tables {
    pub(crate) fn upsert_season_participant(
        &mut self,
        season: &str,
        player_id: &str,
        elo_change: i32,
    ) -> Result<SeasonParticipant, AppError> {
        if !self.has_season(season) || !self.has_player(player_id) {
            return Err(AppError::ReferenceNotFound(MISSING_REFERENCE.to_string()));
        }

        if let Some(existing) = self
            .season_participants
            .iter_mut()
            .find(|p| p.season_name == season && p.player_id == player_id)
        {
            existing.elo = floored_elo(existing.elo, elo_change);
            existing.games_played += 1;
            return Ok(existing.clone());
        }

        let participant = SeasonParticipant {
            id: self.next_id(),
            season_name: season.to_string(),
            player_id: player_id.to_string(),
            elo: floored_elo(START_ELO, elo_change),
            games_played: 1,
            created_at: Utc::now(),
        };
        self.season_participants.push(participant.clone());
        Ok(participant)
    }
}

/// In-memory implementation of SeasonRepository for development and testing
pub struct InMemorySeasonRepository {
    db: Arc<MemoryDatabase>,
    season: String,
}

impl InMemorySeasonRepository {
    pub fn new(db: Arc<MemoryDatabase>, season: &str) -> Self {
        Self {
            db,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl SeasonRepository for InMemorySeasonRepository {
    fn season_name(&self) -> &str {
        &self.season
    }

    async fn ensure_season(&self) -> Result<(), AppError> {
        let mut tables = self.db.tables();
        if !tables.has_season(&self.season) {
            tables.seasons.push(self.season.clone());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_all(&self) -> Result<Vec<SeasonParticipant>, AppError> {
        let mut participants: Vec<SeasonParticipant> = self
            .db
            .tables()
            .season_participants
            .iter()
            .filter(|p| p.season_name == self.season)
            .cloned()
            .collect();
        participants.sort_by(|a, b| b.elo.cmp(&a.elo));
        Ok(participants)
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_participant(
        &self,
        player_id: &str,
    ) -> Result<Option<SeasonParticipant>, AppError> {
        Ok(self
            .db
            .tables()
            .season_participants
            .iter()
            .find(|p| p.season_name == self.season && p.player_id == player_id)
            .cloned())
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn upsert_season_participant(
        &self,
        player_id: &str,
        elo_change: i32,
    ) -> Result<SeasonParticipant, AppError> {
        let participant = self.db.transaction(|tables| {
            tables.upsert_season_participant(&self.season, player_id, elo_change)
        })?;
        debug!(
            player_id = %player_id,
            elo = participant.elo,
            games_played = participant.games_played,
            "Season participant upserted in memory"
        );
        Ok(participant)
    }
}

const UPSERT_PARTICIPANT_QUERY: &str = "\
    INSERT INTO season_participants (season_name, player_id, elo, games_played) \
    VALUES ($1, $2, GREATEST(0, $3 + $4), 1) \
    ON CONFLICT (season_name, player_id) DO UPDATE \
    SET elo = GREATEST(0, season_participants.elo + $4), \
        games_played = season_participants.games_played + 1 \
    RETURNING id, season_name, player_id, elo, games_played, created_at";

/// Single-statement upsert so concurrent writers cannot lose an update.
pub(crate) async fn upsert_participant_row<'e, E>(
    executor: E,
    season: &str,
    player_id: &str,
    elo_change: i32,
) -> Result<SeasonParticipant, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_as::<_, SeasonParticipant>(UPSERT_PARTICIPANT_QUERY)
        .bind(season.to_owned())
        .bind(player_id.to_owned())
        .bind(START_ELO)
        .bind(elo_change)
        .fetch_one(executor)
        .await
}

/// PostgreSQL implementation of season repository
pub struct PostgresSeasonRepository {
    pool: PgPool,
    season: String,
}

impl PostgresSeasonRepository {
    pub fn new(pool: PgPool, season: &str) -> Self {
        Self {
            pool,
            season: season.to_string(),
        }
    }
}

#[async_trait]
impl SeasonRepository for PostgresSeasonRepository {
    fn season_name(&self) -> &str {
        &self.season
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn ensure_season(&self) -> Result<(), AppError> {
        let result = sqlx::query("INSERT INTO seasons (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(&self.season)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create season");
                AppError::StorageFault(e.to_string())
            })?;

        if result.rows_affected() > 0 {
            info!(season = %self.season, "Created season");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_all(&self) -> Result<Vec<SeasonParticipant>, AppError> {
        sqlx::query_as::<_, SeasonParticipant>(
            "SELECT id, season_name, player_id, elo, games_played, created_at \
             FROM season_participants WHERE season_name = $1 ORDER BY elo DESC, id",
        )
        .bind(&self.season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch season participants");
            AppError::StorageFault(e.to_string())
        })
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn get_participant(
        &self,
        player_id: &str,
    ) -> Result<Option<SeasonParticipant>, AppError> {
        sqlx::query_as::<_, SeasonParticipant>(
            "SELECT id, season_name, player_id, elo, games_played, created_at \
             FROM season_participants WHERE season_name = $1 AND player_id = $2",
        )
        .bind(&self.season)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id = %player_id, "Failed to fetch season participant");
            AppError::StorageFault(e.to_string())
        })
    }

    #[instrument(skip(self), fields(season = %self.season))]
    async fn upsert_season_participant(
        &self,
        player_id: &str,
        elo_change: i32,
    ) -> Result<SeasonParticipant, AppError> {
        let participant = upsert_participant_row(&self.pool, &self.season, player_id, elo_change)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = %player_id, "Failed to upsert season participant");
                map_sqlx_error(e, MISSING_REFERENCE, MISSING_REFERENCE)
            })?;

        debug!(
            player_id = %player_id,
            elo = participant.elo,
            games_played = participant.games_played,
            "Season participant upserted in database"
        );
        Ok(participant)
    }
}
