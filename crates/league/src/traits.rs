//! Narrow data-access ports consumed by the rotation engine.
//!
//! Implementations hold no business logic. Postgres adapters live in
//! [`crate::postgres`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::error::Result;
use storage::models::{LeaderboardHistory, League, Profile};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Members of a league, weekly score descending, ties by user id ascending
    async fn ranked_members(&self, league_id: i32, limit: i64) -> Result<Vec<Profile>>;

    /// Persist the profile's league. Score counters are owned by the scoring
    /// path and must not be written here.
    async fn update(&self, profile: &Profile) -> Result<()>;

    /// Set every weekly score to zero, returning how many profiles changed
    async fn reset_all_weekly_scores(&self) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait LeagueCatalog: Send + Sync {
    /// Every tier, ordered by ordinal
    async fn all_tiers(&self) -> Result<Vec<League>>;
}

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Write a snapshot unless its natural key already exists. Returns whether
    /// a new record was created.
    async fn save_snapshot(&self, record: &LeaderboardHistory) -> Result<bool>;

    async fn query_by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        league_id: i32,
    ) -> Result<Vec<LeaderboardHistory>>;
}

#[async_trait::async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Start of the last claimed period
    async fn last_rotated_period(&self) -> Result<Option<DateTime<Utc>>>;

    /// Atomically claim `period_start` across every instance sharing the
    /// store. Returns `false` if it, or a later period, was already claimed.
    async fn claim_period(&self, period_start: DateTime<Utc>) -> Result<bool>;

    /// Mark the claimed period as fully rotated
    async fn complete_period(&self, period_start: DateTime<Utc>) -> Result<()>;
}

/// Read side used by the leaderboard views
#[async_trait::async_trait]
pub trait StandingsStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Profile>;

    /// All profiles, lifetime score descending, ties by user id ascending
    async fn global_leaders(&self, limit: i64) -> Result<Vec<Profile>>;

    async fn league_rank_of(&self, user_id: Uuid) -> Result<i64>;

    async fn global_rank_of(&self, user_id: Uuid) -> Result<i64>;
}

/// The stores a rotation needs, bundled for wiring
#[derive(Clone)]
pub struct RotationPorts {
    pub profiles: Arc<dyn ProfileStore>,
    pub catalog: Arc<dyn LeagueCatalog>,
    pub history: Arc<dyn HistoryStore>,
    pub watermark: Arc<dyn WatermarkStore>,
}
