use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::League;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeagueResponse {
    pub league_id: i32,
    pub slug: String,
    pub name: String,
    pub order_index: i32,
    pub icon_url: Option<String>,
}

impl From<League> for LeagueResponse {
    fn from(league: League) -> Self {
        Self {
            league_id: league.league_id,
            slug: league.slug,
            name: league.name,
            order_index: league.order_index,
            icon_url: league.icon_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaguesListResponse {
    pub leagues: Vec<LeagueResponse>,
}
