use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        history::{HistoryEntryResponse, HistoryQuery},
        league::{LeagueResponse, LeaguesListResponse},
    },
};
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leagues",
    responses(
        (status = 200, description = "List all leagues, lowest tier first", body = LeaguesListResponse)
    ),
    tag = "leagues"
)]
pub async fn list_leagues(State(db): State<Database>) -> WebResult<Response> {
    let leagues = services::list_leagues(db.pool()).await?;

    let response = LeaguesListResponse {
        leagues: leagues.into_iter().map(LeagueResponse::from).collect(),
    };

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leagues/{league_id}/history",
    params(
        ("league_id" = i32, Path, description = "League id"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Snapshot of the league's final standings for the period", body = Vec<HistoryEntryResponse>),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "League not found")
    ),
    tag = "leagues"
)]
pub async fn get_league_history(
    State(db): State<Database>,
    Path(league_id): Path<i32>,
    Query(query): Query<HistoryQuery>,
) -> WebResult<Response> {
    query.validate()?;

    let records = services::get_league_history(
        db.pool(),
        league_id,
        query.period_start,
        query.period_end(),
    )
    .await?;

    let response: Vec<HistoryEntryResponse> =
        records.into_iter().map(HistoryEntryResponse::from).collect();

    Ok(Json(response).into_response())
}
