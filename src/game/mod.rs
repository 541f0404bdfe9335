// Public API
pub use handlers::{get_game, list_games};
pub use models::{Game, GameParticipant, GameWithParticipants, NewGameParticipant};
pub use repository::GameRepository;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
