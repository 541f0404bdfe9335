use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::models::{Game, GameWithParticipants};
use crate::shared::{AppError, AppState};

/// HTTP handler for a registered game and its participants
///
/// GET /games/:bga_id
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(bga_id): Path<String>,
) -> Result<Json<GameWithParticipants>, AppError> {
    let game = state
        .games
        .get_game_with_participants(&bga_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("game {bga_id}")))?;

    Ok(Json(game))
}

/// GET /games
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, AppError> {
    let games = state.games.list_games().await?;
    info!(game_count = games.len(), "Games listed");
    Ok(Json(games))
}
