use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::announcer::Announcer;
use crate::auth::TokenConfig;
use crate::config::Settings;
use crate::database::Repositories;
use crate::game::repository::GameRepository;
use crate::gate::CommandGate;
use crate::leaderboard::LeaderboardService;
use crate::player::PlayerService;
use crate::rating::RatingEngine;
use crate::registration::{GameRegistrationService, OutcomeResolver, RegistrationDispatcher};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<PlayerService>,
    pub games: Arc<dyn GameRepository>,
    pub leaderboard: Arc<LeaderboardService>,
    pub registrations: Arc<GameRegistrationService>,
    pub dispatcher: Arc<RegistrationDispatcher>,
    pub tokens: TokenConfig,
}

impl AppState {
    /// Wires the services on top of the given storage backend and boundary collaborators.
    pub fn new(
        repositories: Repositories,
        settings: &Settings,
        resolver: Arc<dyn OutcomeResolver>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        let players = Arc::new(PlayerService::new(
            Arc::clone(&repositories.players),
            Arc::clone(&announcer),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(
            Arc::clone(&repositories.seasons),
            Arc::clone(&repositories.players),
        ));
        let registrations = Arc::new(GameRegistrationService::new(
            &repositories,
            RatingEngine::new(settings.rating),
            settings.max_game_age,
        ));
        let dispatcher = Arc::new(RegistrationDispatcher::new(
            CommandGate::new(settings.command_cooldown),
            resolver,
            Arc::clone(&registrations),
            Arc::clone(&leaderboard),
            announcer,
            settings.resolve_timeout,
        ));

        Self {
            players,
            games: repositories.games,
            leaderboard,
            registrations,
            dispatcher,
            tokens: settings.token.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyRegistered(String),

    #[error("less than two registered players found for game (found {registered})")]
    InsufficientPlayers { registered: usize },

    #[error("{0}")]
    ReferenceNotFound(String),

    #[error("Invalid game outcome: {0}")]
    InvalidOutcome(String),

    #[error(
        "you are limited to one command per {cooldown_minutes} minutes, ask a moderator to issue the command for you"
    )]
    RateLimited { cooldown_minutes: i64 },

    #[error("Storage error: {0}")]
    StorageFault(String),

    #[error("Could not resolve game outcome: {0}")]
    UpstreamFault(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::JwtError(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            AppError::InsufficientPlayers { .. }
            | AppError::ReferenceNotFound(_)
            | AppError::InvalidOutcome(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::StorageFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamFault(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
