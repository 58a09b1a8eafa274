use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Immutable snapshot of one member's standing at the end of a rotation period.
///
/// Natural key: `(user_id, period_start, period_end, league_id)`. Rows are
/// never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardHistory {
    pub history_id: Uuid,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub user_id: Uuid,
    pub league_id: i32,
    /// 1-based position inside the league at snapshot time
    pub rank: i32,
    pub weekly_xp: i64,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardHistory {
    pub fn new(
        user_id: Uuid,
        league_id: i32,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        rank: i32,
        weekly_xp: i64,
    ) -> Self {
        Self {
            history_id: Uuid::new_v4(),
            period_start,
            period_end,
            user_id,
            league_id,
            rank,
            weekly_xp,
            created_at: Utc::now(),
        }
    }
}
