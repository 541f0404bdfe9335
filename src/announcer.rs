use async_trait::async_trait;
use strum_macros::{Display, EnumString};
use tracing::{info, instrument};

use crate::shared::AppError;

/// Channels that hold a single, regularly replaced message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Board {
    Leaderboard,
    #[strum(serialize = "registered-players")]
    Players,
}

/// Outbound messaging towards the chat community
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Sends a message addressed to a single caller
    async fn send(&self, caller_id: &str, message: &str) -> Result<(), AppError>;

    /// Replaces the content shown on `board`
    async fn publish(&self, board: Board, content: &str) -> Result<(), AppError>;
}

/// Announcer that only writes to the log
pub struct LogAnnouncer;

#[async_trait]
impl Announcer for LogAnnouncer {
    #[instrument(skip(self, message))]
    async fn send(&self, caller_id: &str, message: &str) -> Result<(), AppError> {
        info!(caller_id = %caller_id, "{message}");
        Ok(())
    }

    #[instrument(skip(self, content))]
    async fn publish(&self, board: Board, content: &str) -> Result<(), AppError> {
        info!(board = %board, "Publishing board\n{content}");
        Ok(())
    }
}
