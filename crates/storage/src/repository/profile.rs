use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Profile;

const PROFILE_COLUMNS: &str = r#"
    profile_id, user_id, display_name, avatar_url, total_xp, weekly_xp, level,
    current_league_id, current_streak, max_streak, last_activity_at,
    created_at, updated_at
"#;

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Profile> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM student_profiles WHERE user_id = $1");

        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(profile)
    }

    /// Members of one league ordered by weekly XP, ties broken by user id.
    ///
    /// A single statement, so the page comes from one consistent snapshot even
    /// while scores are being written concurrently.
    pub async fn league_leaderboard(&self, league_id: i32, limit: i64) -> Result<Vec<Profile>> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM student_profiles
            WHERE current_league_id = $1
            ORDER BY weekly_xp DESC, user_id ASC
            LIMIT $2
            "#
        );

        let profiles = sqlx::query_as::<_, Profile>(&query)
            .bind(league_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(profiles)
    }

    /// All profiles ordered by lifetime XP, ties broken by user id
    pub async fn global_leaderboard(&self, limit: i64) -> Result<Vec<Profile>> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM student_profiles
            ORDER BY total_xp DESC, user_id ASC
            LIMIT $1
            "#
        );

        let profiles = sqlx::query_as::<_, Profile>(&query)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(profiles)
    }

    /// 1-based position of the user inside their current league, using the
    /// same ordering as [`Self::league_leaderboard`]
    pub async fn league_rank_of(&self, user_id: Uuid) -> Result<i64> {
        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            WITH me AS (
                SELECT user_id, current_league_id, weekly_xp
                FROM student_profiles
                WHERE user_id = $1
            )
            SELECT (
                SELECT COUNT(*)
                FROM student_profiles o
                WHERE o.current_league_id = me.current_league_id
                  AND (o.weekly_xp > me.weekly_xp
                       OR (o.weekly_xp = me.weekly_xp AND o.user_id < me.user_id))
            ) + 1 AS rank
            FROM me
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(rank)
    }

    /// 1-based position of the user in the all-time ordering
    pub async fn global_rank_of(&self, user_id: Uuid) -> Result<i64> {
        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            WITH me AS (
                SELECT user_id, total_xp
                FROM student_profiles
                WHERE user_id = $1
            )
            SELECT (
                SELECT COUNT(*)
                FROM student_profiles o
                WHERE o.total_xp > me.total_xp
                   OR (o.total_xp = me.total_xp AND o.user_id < me.user_id)
            ) + 1 AS rank
            FROM me
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(rank)
    }

    /// Move a profile to another league. Score counters are not touched, so
    /// concurrent XP grants are never overwritten.
    pub async fn update_league(&self, profile_id: Uuid, league_id: i32) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE student_profiles
            SET current_league_id = $2,
                updated_at = NOW()
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .bind(league_id)
        .execute(self.pool)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                StorageError::ConstraintViolation(format!("league {league_id} does not exist"))
            } else {
                e
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Set every weekly accumulator to zero. Absolute, so repeating it is
    /// harmless. Returns the number of profiles that changed.
    pub async fn reset_all_weekly_xp(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE student_profiles
            SET weekly_xp = 0,
                updated_at = NOW()
            WHERE weekly_xp <> 0
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
