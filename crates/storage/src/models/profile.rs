use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-user gamification state.
///
/// The scoring path owns `total_xp`, `weekly_xp` and the streak counters. The
/// weekly rotation only ever writes `current_league_id` and zeroes `weekly_xp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub profile_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub total_xp: i64,
    pub weekly_xp: i64,
    pub level: i32,
    pub current_league_id: i32,
    pub current_streak: i32,
    pub max_streak: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
