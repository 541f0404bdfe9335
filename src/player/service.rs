use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{format_roster, Player},
    repository::PlayerRepository,
};
use crate::announcer::{Announcer, Board};
use crate::shared::AppError;

/// Service for the administrative player registry
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository>,
    announcer: Arc<dyn Announcer>,
}

impl PlayerService {
    pub fn new(repository: Arc<dyn PlayerRepository>, announcer: Arc<dyn Announcer>) -> Self {
        Self {
            repository,
            announcer,
        }
    }

    /// Registers a player. Only privileged callers may add players.
    #[instrument(skip(self))]
    pub async fn add_player(
        &self,
        privileged: bool,
        name: &str,
        external_id: &str,
    ) -> Result<Player, AppError> {
        if !privileged {
            warn!(name = %name, "Unprivileged caller tried to add a player");
            return Err(AppError::Unauthorized(
                "you do not have permission to add a player".to_string(),
            ));
        }

        let name = name.trim();
        let external_id = external_id.trim();
        if name.is_empty() || external_id.is_empty() {
            return Err(AppError::InvalidRequest(
                "player name and id must not be empty".to_string(),
            ));
        }

        let player = self.repository.insert_player(name, external_id).await?;
        info!(name = %player.name, external_id = %player.external_id, "Player added");

        self.publish_roster().await;
        Ok(player)
    }

    /// Removes a player that has no rating history
    #[instrument(skip(self))]
    pub async fn remove_player(&self, privileged: bool, name: &str) -> Result<(), AppError> {
        if !privileged {
            return Err(AppError::Unauthorized(
                "you do not have permission to remove a player".to_string(),
            ));
        }

        self.repository.delete_player(name).await?;
        info!(name = %name, "Player removed");

        self.publish_roster().await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_players(&self) -> Result<Vec<Player>, AppError> {
        let players = self.repository.get_players().await?;
        debug!(player_count = players.len(), "Players listed");
        Ok(players)
    }

    async fn publish_roster(&self) {
        let players = match self.repository.get_players().await {
            Ok(players) => players,
            Err(e) => {
                warn!(error = %e, "Could not load players for roster");
                return;
            }
        };

        if let Err(e) = self
            .announcer
            .publish(Board::Players, &format_roster(&players))
            .await
        {
            warn!(error = %e, "Could not publish player roster");
        }
    }
}
