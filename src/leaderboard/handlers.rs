use axum::{extract::State, Json};
use tracing::instrument;

use super::models::Leaderboard;
use crate::shared::{AppError, AppState};

/// HTTP handler for the current season's leaderboard
///
/// GET /leaderboard
/// Public, no token required
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Json<Leaderboard>, AppError> {
    let leaderboard = state.leaderboard.get_leaderboard().await?;
    Ok(Json(leaderboard))
}
