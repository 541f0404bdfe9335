// Public API - what other modules can use
pub use handlers::{add_player, list_players, remove_player};
pub use models::Player;
pub use repository::PlayerRepository;
pub use service::PlayerService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
