pub use handlers::get_leaderboard;
pub use models::{Leaderboard, LeaderboardEntry};
pub use service::LeaderboardService;

mod handlers;
mod models;
mod service;
