use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use url::Url;

use crate::rating::GameOutcome;
use crate::shared::AppError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("table {0} does not exist")]
    NotFound(String),

    #[error("invalid table reference: {0}")]
    InvalidReference(String),

    #[error("game is not Terra Mystica")]
    UnsupportedGame,

    #[error("fan factions are not enabled")]
    SettingNotEnabled,

    #[error("game is too old")]
    Stale,

    #[error("could not read game result: {0}")]
    MalformedResult(String),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        AppError::UpstreamFault(err.to_string())
    }
}

/// Reads the outcome of a finished game from the game platform
#[async_trait]
pub trait OutcomeResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<GameOutcome, ResolveError>;
}

/// Extracts the numeric table id from a bare id or a table URL (`...?table=<id>`).
pub fn parse_table_id(reference: &str) -> Result<String, ResolveError> {
    let reference = reference.trim();
    let invalid = || ResolveError::InvalidReference(reference.to_string());

    let id = if reference.chars().all(|c| c.is_ascii_digit()) {
        reference.to_string()
    } else {
        let url = Url::parse(reference).map_err(|_| invalid())?;
        url.query_pairs()
            .find(|(key, _)| key == "table")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(invalid)?
    };

    if id.is_empty() || id.parse::<u64>().is_err() {
        return Err(invalid());
    }
    Ok(id)
}

/// Resolver backed by outcomes held in memory, keyed by table id
#[derive(Default)]
pub struct InMemoryOutcomeResolver {
    outcomes: RwLock<HashMap<String, GameOutcome>>,
}

impl InMemoryOutcomeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = GameOutcome>) -> Self {
        Self {
            outcomes: RwLock::new(outcomes.into_iter().map(|o| (o.id.clone(), o)).collect()),
        }
    }

    /// Loads a JSON array of outcomes
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResolveError::MalformedResult(format!("{}: {e}", path.display())))?;
        let outcomes: Vec<GameOutcome> = serde_json::from_str(&raw)
            .map_err(|e| ResolveError::MalformedResult(format!("{}: {e}", path.display())))?;

        info!(count = outcomes.len(), path = %path.display(), "Loaded game outcomes");
        Ok(Self::with_outcomes(outcomes))
    }

    pub async fn insert(&self, outcome: GameOutcome) {
        self.outcomes.write().await.insert(outcome.id.clone(), outcome);
    }
}

#[async_trait]
impl OutcomeResolver for InMemoryOutcomeResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, reference: &str) -> Result<GameOutcome, ResolveError> {
        let table_id = parse_table_id(reference)?;
        let outcome = self
            .outcomes
            .read()
            .await
            .get(&table_id)
            .cloned()
            .ok_or(ResolveError::NotFound(table_id))?;

        debug!(bga_id = %outcome.id, players = outcome.players.len(), "Resolved game outcome");
        Ok(outcome)
    }
}
