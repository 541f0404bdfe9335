pub mod models;
pub mod repository;

pub use models::{floored_elo, SeasonParticipant, START_ELO};
pub use repository::SeasonRepository;
