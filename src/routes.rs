use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::caller_auth;
use crate::game::{get_game, list_games};
use crate::leaderboard::get_leaderboard;
use crate::player::{add_player, list_players, remove_player};
use crate::registration::register_game;
use crate::shared::AppState;

/// All HTTP routes. Everything except the leaderboard needs a caller token.
pub fn router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/players", post(add_player).get(list_players))
        .route("/players/:name", delete(remove_player))
        .route("/games", post(register_game).get(list_games))
        .route("/games/:bga_id", get(get_game))
        .route_layer(middleware::from_fn_with_state(state.clone(), caller_auth));

    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
