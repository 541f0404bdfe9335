pub use middleware::caller_auth;
pub use token::TokenConfig;
pub use types::CallerClaims;

mod middleware;
mod token;
mod types;
