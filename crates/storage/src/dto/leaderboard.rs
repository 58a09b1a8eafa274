use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::LimitParams;
use crate::models::Profile;

/// Query for the league-scoped weekly leaderboard
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyLeaderboardQuery {
    /// Requesting user; their league is used when `league_id` is absent
    pub user_id: Option<Uuid>,
    /// Explicit league to show
    pub league_id: Option<i32>,
    /// Number of entries to return (default 50, capped at 100)
    pub limit: Option<u32>,
}

/// Query for the all-time global leaderboard
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GlobalLeaderboardQuery {
    /// Requesting user, used to report their own rank
    pub user_id: Option<Uuid>,
    /// Number of entries to return (default 50, capped at 100)
    pub limit: Option<u32>,
}

impl WeeklyLeaderboardQuery {
    pub fn limit(&self) -> u32 {
        LimitParams::new(self.limit).limit()
    }
}

impl GlobalLeaderboardQuery {
    pub fn limit(&self) -> u32 {
        LimitParams::new(self.limit).limit()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub score: i64,
    pub level: i32,
    pub league_id: i32,
}

impl LeaderboardEntry {
    pub fn new(rank: i64, profile: &Profile, score: i64) -> Self {
        Self {
            rank,
            user_id: profile.user_id,
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            score,
            level: profile.level,
            league_id: profile.current_league_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Requester's own rank, present even when they are outside the page
    pub user_rank: Option<i64>,
}
