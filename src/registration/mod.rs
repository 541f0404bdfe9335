// Public API
pub use dispatcher::RegistrationDispatcher;
pub use format::format_game_result;
pub use handlers::register_game;
pub use ledger::{
    InMemoryRegistrationLedger, PostgresRegistrationLedger, RegisteredGame, RegistrationLedger,
};
pub use resolver::{parse_table_id, InMemoryOutcomeResolver, OutcomeResolver, ResolveError};
pub use service::GameRegistrationService;
pub use types::{RankedResult, RegisterGameRequest, RegisterGameResponse};

// Internal modules
mod dispatcher;
mod format;
mod handlers;
mod ledger;
mod resolver;
mod service;
mod types;
