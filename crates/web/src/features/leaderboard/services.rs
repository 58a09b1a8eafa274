use league::Standings;
use storage::{dto::leaderboard::LeaderboardResponse, error::Result};
use uuid::Uuid;

/// Weekly leaderboard of one league, scoped to the requester's league by default
pub async fn get_weekly_leaderboard(
    standings: &Standings,
    user_id: Option<Uuid>,
    league_id: Option<i32>,
    limit: u32,
) -> Result<LeaderboardResponse> {
    standings.weekly(user_id, league_id, limit).await
}

/// All-time leaderboard across every league
pub async fn get_global_leaderboard(
    standings: &Standings,
    user_id: Option<Uuid>,
    limit: u32,
) -> Result<LeaderboardResponse> {
    standings.global(user_id, limit).await
}
