use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::types::{RegisterGameRequest, RegisterGameResponse};
use crate::auth::CallerClaims;
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a finished game
///
/// POST /games
/// Accepted callers get 202 right away; the result is announced when the registration finishes.
#[instrument(name = "register_game", skip(state, claims), fields(caller_id = %claims.caller_id))]
pub async fn register_game(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(request): Json<RegisterGameRequest>,
) -> Result<(StatusCode, Json<RegisterGameResponse>), AppError> {
    let reference = request.reference.trim();
    if reference.is_empty() {
        return Err(AppError::InvalidRequest(
            "a game link or table id is required".to_string(),
        ));
    }

    state
        .dispatcher
        .submit(&claims.caller_id, claims.privileged, reference)?;

    info!(reference = %reference, "Game registration started");

    Ok((
        StatusCode::ACCEPTED,
        Json(RegisterGameResponse {
            message: format!("<@{}> registering game, please wait", claims.caller_id),
        }),
    ))
}
