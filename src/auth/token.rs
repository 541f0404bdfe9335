use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::CallerClaims;
use crate::shared::AppError;

const DEVELOPMENT_SECRET: &str = "ladder-development-secret";

/// Signs and checks caller tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: &str, expiration_days: i64) -> Self {
        Self {
            secret: secret.to_string(),
            expiration_days,
        }
    }

    #[instrument(skip(self, display_name))]
    pub fn create_token(
        &self,
        caller_id: &str,
        display_name: &str,
        privileged: bool,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        let claims = CallerClaims {
            caller_id: caller_id.to_string(),
            display_name: display_name.to_string(),
            privileged,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<CallerClaims, AppError> {
        decode::<CallerClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                caller_id = %data.claims.caller_id,
                privileged = data.claims.privileged,
                "JWT token decoded"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new(DEVELOPMENT_SECRET, 365)
    }
}
