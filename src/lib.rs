// Library crate for the ladder service
// This file exposes the public API for the binary and integration tests

pub mod announcer;
pub mod auth;
pub mod config;
pub mod database;
pub mod game;
pub mod gate;
pub mod leaderboard;
pub mod player;
pub mod rating;
pub mod registration;
pub mod routes;
pub mod season;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use announcer::{Announcer, Board, LogAnnouncer};
pub use config::{Args, Settings};
pub use database::{MemoryDatabase, Repositories};
pub use gate::CommandGate;
pub use rating::{
    FanFactionSetting, GameOutcome, PlayerResult, RatingConfig, RatingEngine, Rounding,
};
pub use registration::{
    GameRegistrationService, InMemoryOutcomeResolver, OutcomeResolver, RankedResult,
};
pub use routes::router;
pub use shared::{AppError, AppState};
