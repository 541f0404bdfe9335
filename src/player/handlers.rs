use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::types::{AddPlayerRequest, PlayerResponse};
use crate::auth::CallerClaims;
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a player
///
/// POST /players
/// Requires a privileged caller
#[instrument(name = "add_player", skip(state, claims), fields(caller_id = %claims.caller_id))]
pub async fn add_player(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(request): Json<AddPlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    let player = state
        .players
        .add_player(claims.privileged, &request.name, &request.external_id)
        .await?;

    info!(name = %player.name, "Player registered via API");

    Ok((StatusCode::CREATED, Json(player.into())))
}

/// HTTP handler for listing registered players
///
/// GET /players
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    let players = state.players.list_players().await?;
    Ok(Json(players.into_iter().map(PlayerResponse::from).collect()))
}

/// HTTP handler for removing a player
///
/// DELETE /players/:name
/// Requires a privileged caller
#[instrument(name = "remove_player", skip(state, claims), fields(caller_id = %claims.caller_id))]
pub async fn remove_player(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.players.remove_player(claims.privileged, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
