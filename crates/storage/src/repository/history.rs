use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::LeaderboardHistory;

pub struct HistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a snapshot unless one already exists for its natural key.
    /// Returns whether a new row was written.
    pub async fn insert(&self, record: &LeaderboardHistory) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaderboard_history
                (history_id, period_start, period_end, user_id, league_id, rank, weekly_xp, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT ON CONSTRAINT uq_leaderboard_history_natural_key DO NOTHING
            "#,
        )
        .bind(record.history_id)
        .bind(record.period_start)
        .bind(record.period_end)
        .bind(record.user_id)
        .bind(record.league_id)
        .bind(record.rank)
        .bind(record.weekly_xp)
        .bind(record.created_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        league_id: i32,
    ) -> Result<Vec<LeaderboardHistory>> {
        let records = sqlx::query_as::<_, LeaderboardHistory>(
            r#"
            SELECT history_id, period_start, period_end, user_id, league_id, rank, weekly_xp, created_at
            FROM leaderboard_history
            WHERE period_start = $1 AND period_end = $2 AND league_id = $3
            ORDER BY rank ASC
            "#,
        )
        .bind(period_start)
        .bind(period_end)
        .bind(league_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}
