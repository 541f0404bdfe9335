use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use super::format::{format_error, format_game_result};
use super::resolver::OutcomeResolver;
use super::service::GameRegistrationService;
use crate::announcer::{Announcer, Board};
use crate::gate::CommandGate;
use crate::leaderboard::LeaderboardService;
use crate::shared::AppError;

/// Runs admitted game registrations in the background and reports back to the caller.
///
/// Admission is decided synchronously by the command gate. Everything after that
/// (resolving the outcome, rating, storing, announcing) happens on a spawned task
/// so a slow game platform never holds up the request.
pub struct RegistrationDispatcher {
    gate: CommandGate,
    resolver: Arc<dyn OutcomeResolver>,
    registrations: Arc<GameRegistrationService>,
    leaderboard: Arc<LeaderboardService>,
    announcer: Arc<dyn Announcer>,
    resolve_timeout: Duration,
}

impl RegistrationDispatcher {
    pub fn new(
        gate: CommandGate,
        resolver: Arc<dyn OutcomeResolver>,
        registrations: Arc<GameRegistrationService>,
        leaderboard: Arc<LeaderboardService>,
        announcer: Arc<dyn Announcer>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            gate,
            resolver,
            registrations,
            leaderboard,
            announcer,
            resolve_timeout,
        }
    }

    pub fn gate(&self) -> &CommandGate {
        &self.gate
    }

    /// Admits the request and starts the registration on its own task.
    #[instrument(skip(self))]
    pub fn submit(
        self: &Arc<Self>,
        caller_id: &str,
        privileged: bool,
        reference: &str,
    ) -> Result<JoinHandle<()>, AppError> {
        self.gate.admit(caller_id, privileged)?;
        info!("Game registration accepted");

        let dispatcher = Arc::clone(self);
        let caller_id = caller_id.to_string();
        let reference = reference.to_string();
        Ok(tokio::spawn(async move {
            dispatcher.process(&caller_id, &reference).await;
        }))
    }

    /// Registers the game and tells the caller how it went. Never fails: errors are sent to the caller.
    #[instrument(skip(self))]
    pub async fn process(&self, caller_id: &str, reference: &str) {
        match self.register(caller_id, reference).await {
            Ok(message) => {
                self.publish_leaderboard().await;
                if let Err(e) = self.announcer.send(caller_id, &message).await {
                    warn!(error = %e, "Could not send game result");
                }
            }
            Err(e) => {
                error!(error = %e, "Could not register game");
                if let Err(send_error) = self
                    .announcer
                    .send(caller_id, &format_error(caller_id, &e))
                    .await
                {
                    warn!(error = %send_error, "Could not send registration error");
                }
            }
        }
    }

    /// Resolves and registers the game, returning the result message
    pub async fn register(&self, caller_id: &str, reference: &str) -> Result<String, AppError> {
        let outcome = timeout(self.resolve_timeout, self.resolver.resolve(reference))
            .await
            .map_err(|_| {
                AppError::UpstreamFault(format!(
                    "timed out after {}s reading game {reference}",
                    self.resolve_timeout.as_secs()
                ))
            })??;

        let results = self.registrations.register_game(&outcome).await?;
        Ok(format_game_result(caller_id, &outcome.table_link(), &results))
    }

    async fn publish_leaderboard(&self) {
        let leaderboard = match self.leaderboard.get_leaderboard().await {
            Ok(leaderboard) => leaderboard,
            Err(e) => {
                warn!(error = %e, "Could not load leaderboard");
                return;
            }
        };

        if let Err(e) = self
            .announcer
            .publish(Board::Leaderboard, &format!("```\n{leaderboard}\n```"))
            .await
        {
            warn!(error = %e, "Could not publish leaderboard");
        }
    }
}
