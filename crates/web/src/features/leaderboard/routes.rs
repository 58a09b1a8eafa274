use axum::{Router, extract::FromRef, routing::get};
use league::Standings;

use super::handlers::{get_global_leaderboard, get_weekly_leaderboard};

pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Standings: FromRef<S>,
{
    Router::new()
        .route("/weekly", get(get_weekly_leaderboard))
        .route("/global", get(get_global_leaderboard))
}
