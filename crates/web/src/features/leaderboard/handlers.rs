use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use league::Standings;
use storage::dto::leaderboard::{
    GlobalLeaderboardQuery, LeaderboardResponse, WeeklyLeaderboardQuery,
};

use crate::error::{WebError, WebResult};

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard/weekly",
    params(WeeklyLeaderboardQuery),
    responses(
        (status = 200, description = "Weekly league leaderboard retrieved successfully", body = LeaderboardResponse),
        (status = 400, description = "Neither user_id nor league_id was given"),
        (status = 404, description = "Requesting user not found")
    ),
    tag = "leaderboard"
)]
pub async fn get_weekly_leaderboard(
    State(standings): State<Standings>,
    Query(query): Query<WeeklyLeaderboardQuery>,
) -> WebResult<Response> {
    if query.user_id.is_none() && query.league_id.is_none() {
        return Err(WebError::BadRequest(
            "Either user_id or league_id is required".to_string(),
        ));
    }

    let response = services::get_weekly_leaderboard(
        &standings,
        query.user_id,
        query.league_id,
        query.limit(),
    )
    .await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leaderboard/global",
    params(GlobalLeaderboardQuery),
    responses(
        (status = 200, description = "Global leaderboard retrieved successfully", body = LeaderboardResponse),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "leaderboard"
)]
pub async fn get_global_leaderboard(
    State(standings): State<Standings>,
    Query(query): Query<GlobalLeaderboardQuery>,
) -> WebResult<Response> {
    let response =
        services::get_global_leaderboard(&standings, query.user_id, query.limit()).await?;

    Ok(Json(response).into_response())
}
