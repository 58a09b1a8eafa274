use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::RotationWatermark;

pub struct WatermarkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WatermarkRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, job: &str) -> Result<Option<RotationWatermark>> {
        let watermark = sqlx::query_as::<_, RotationWatermark>(
            r#"
            SELECT job, last_period_start, claimed_at, completed_at
            FROM rotation_watermarks
            WHERE job = $1
            "#,
        )
        .bind(job)
        .fetch_optional(self.pool)
        .await?;

        Ok(watermark)
    }

    /// Claim `period_start` for `job` in one statement. Returns `false` when
    /// this or a later period is already claimed, including by a concurrent
    /// caller: the conflicting upsert waits on the row lock and re-checks the
    /// condition against the committed row.
    pub async fn claim(&self, job: &str, period_start: DateTime<Utc>) -> Result<bool> {
        let claimed = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO rotation_watermarks (job, last_period_start, claimed_at, completed_at)
            VALUES ($1, $2, NOW(), NULL)
            ON CONFLICT (job) DO UPDATE
            SET last_period_start = EXCLUDED.last_period_start,
                claimed_at = NOW(),
                completed_at = NULL
            WHERE rotation_watermarks.last_period_start < EXCLUDED.last_period_start
            RETURNING job
            "#,
        )
        .bind(job)
        .bind(period_start)
        .fetch_optional(self.pool)
        .await?;

        Ok(claimed.is_some())
    }

    /// Mark a claimed period as fully rotated
    pub async fn complete(&self, job: &str, period_start: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE rotation_watermarks
            SET completed_at = NOW()
            WHERE job = $1 AND last_period_start = $2
            "#,
        )
        .bind(job)
        .bind(period_start)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
