use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::game::models::{Game, GameParticipant};
use crate::game::repository::{GameRepository, InMemoryGameRepository, PostgresGameRepository};
use crate::player::models::Player;
use crate::player::repository::{
    InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository,
};
use crate::registration::{
    InMemoryRegistrationLedger, PostgresRegistrationLedger, RegistrationLedger,
};
use crate::season::models::SeasonParticipant;
use crate::season::repository::{
    InMemorySeasonRepository, PostgresSeasonRepository, SeasonRepository,
};
use crate::shared::AppError;

/// Message for foreign-key failures on season or player references
pub const MISSING_REFERENCE: &str = "player or season does not exist";

const INITIAL_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Connects to Postgres, retrying with exponential backoff until `budget` is spent.
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str, budget: Duration) -> Result<PgPool, AppError> {
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        let result = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => {
                info!(attempts = attempt + 1, "Connected to database");
                return Ok(pool);
            }
            Err(e) => {
                let delay = backoff_delay(attempt);
                if started.elapsed() + delay > budget {
                    warn!(error = %e, attempts = attempt + 1, "Giving up connecting to database");
                    return Err(AppError::StorageFault(e.to_string()));
                }
                warn!(
                    error = %e,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Database connection failed, will retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to migrate database");
            AppError::StorageFault(e.to_string())
        })?;
    info!("Database migrations applied");
    Ok(())
}

pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let millis = INITIAL_BACKOFF_MS.saturating_mul(2_u64.saturating_pow(attempt));
    Duration::from_millis(millis).min(MAX_BACKOFF)
}

/// Translates constraint violations into domain errors.
///
/// Unique violations become `AlreadyRegistered(conflict)`, foreign-key violations
/// become `ReferenceNotFound(missing_reference)`, check violations are invalid
/// outcome data. Everything else is a storage fault.
pub(crate) fn map_sqlx_error(err: sqlx::Error, conflict: &str, missing_reference: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::AlreadyRegistered(conflict.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ReferenceNotFound(missing_reference.to_string());
        }
        if db_err.is_check_violation() {
            return AppError::InvalidOutcome(db_err.message().to_string());
        }
    }
    AppError::StorageFault(err.to_string())
}

/// The rows held by the in-memory backend. Constraint checks mirror the SQL schema.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) seasons: Vec<String>,
    pub(crate) players: Vec<Player>,
    pub(crate) season_participants: Vec<SeasonParticipant>,
    pub(crate) games: Vec<Game>,
    pub(crate) game_participants: Vec<GameParticipant>,
    last_id: i64,
}

impl Tables {
    pub(crate) fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub(crate) fn has_season(&self, name: &str) -> bool {
        self.seasons.iter().any(|season| season == name)
    }

    pub(crate) fn has_player(&self, external_id: &str) -> bool {
        self.players.iter().any(|p| p.external_id == external_id)
    }
}

/// Shared storage for the in-memory repositories.
///
/// All repositories built on one `MemoryDatabase` see the same rows, so foreign keys
/// can be enforced across them the way the SQL schema does.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the tables and restores the previous rows if it fails.
    pub(crate) fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self.tables();
        let snapshot = tables.clone();
        let result = f(&mut tables);
        if result.is_err() {
            *tables = snapshot;
        }
        result
    }

    /// Number of stored game participation rows (useful for tests)
    pub fn game_participant_count(&self) -> usize {
        self.tables().game_participants.len()
    }
}

/// The storage backend the services run on
#[derive(Clone)]
pub struct Repositories {
    pub players: Arc<dyn PlayerRepository>,
    pub seasons: Arc<dyn SeasonRepository>,
    pub games: Arc<dyn GameRepository>,
    pub ledger: Arc<dyn RegistrationLedger>,
}

impl Repositories {
    /// In-memory backend for development and testing
    pub fn in_memory(season: &str) -> Self {
        Self::in_memory_with(Arc::new(MemoryDatabase::new()), season)
    }

    /// In-memory backend over an existing database, with `season` already created
    pub fn in_memory_with(db: Arc<MemoryDatabase>, season: &str) -> Self {
        {
            let mut tables = db.tables();
            if !tables.has_season(season) {
                tables.seasons.push(season.to_string());
            }
        }

        Self {
            players: Arc::new(InMemoryPlayerRepository::new(Arc::clone(&db))),
            seasons: Arc::new(InMemorySeasonRepository::new(Arc::clone(&db), season)),
            games: Arc::new(InMemoryGameRepository::new(Arc::clone(&db), season)),
            ledger: Arc::new(InMemoryRegistrationLedger::new(db, season)),
        }
    }

    /// PostgreSQL backend. Call `SeasonRepository::ensure_season` before registering games.
    pub fn postgres(pool: PgPool, season: &str) -> Self {
        Self {
            players: Arc::new(PostgresPlayerRepository::new(pool.clone())),
            seasons: Arc::new(PostgresSeasonRepository::new(pool.clone(), season)),
            games: Arc::new(PostgresGameRepository::new(pool.clone(), season)),
            ledger: Arc::new(PostgresRegistrationLedger::new(pool, season)),
        }
    }
}
