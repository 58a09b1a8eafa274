use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    error::Result,
    models::{LeaderboardHistory, League},
    repository::{history::HistoryRepository, league::LeagueRepository},
};

/// List all leagues, lowest tier first
pub async fn list_leagues(pool: &PgPool) -> Result<Vec<League>> {
    let repo = LeagueRepository::new(pool);
    repo.list().await
}

/// Final standings snapshot of a league for one rotation period
pub async fn get_league_history(
    pool: &PgPool,
    league_id: i32,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Result<Vec<LeaderboardHistory>> {
    LeagueRepository::new(pool).find_by_id(league_id).await?;

    let repo = HistoryRepository::new(pool);
    repo.find_by_period(period_start, period_end, league_id).await
}
