use axum::{Router, routing::get};

use super::handlers::{get_league_history, list_leagues};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leagues))
        .route("/:league_id/history", get(get_league_history))
}
