//! Port implementations backed by the `storage` repositories.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::Database;
use storage::error::Result;
use storage::models::{LeaderboardHistory, League, Profile};
use storage::repository::{
    history::HistoryRepository, league::LeagueRepository, profile::ProfileRepository,
    watermark::WatermarkRepository,
};
use uuid::Uuid;

use crate::standings::Standings;
use crate::traits::{
    HistoryStore, LeagueCatalog, ProfileStore, RotationPorts, StandingsStore, WatermarkStore,
};

/// Watermark key of the weekly league rotation
pub const WEEKLY_ROTATION_JOB: &str = "weekly_league_rotation";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn ranked_members(&self, league_id: i32, limit: i64) -> Result<Vec<Profile>> {
        ProfileRepository::new(&self.pool)
            .league_leaderboard(league_id, limit)
            .await
    }

    async fn update(&self, profile: &Profile) -> Result<()> {
        ProfileRepository::new(&self.pool)
            .update_league(profile.profile_id, profile.current_league_id)
            .await
    }

    async fn reset_all_weekly_scores(&self) -> Result<u64> {
        ProfileRepository::new(&self.pool).reset_all_weekly_xp().await
    }
}

#[async_trait::async_trait]
impl StandingsStore for PgProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Profile> {
        ProfileRepository::new(&self.pool).find_by_user_id(user_id).await
    }

    async fn global_leaders(&self, limit: i64) -> Result<Vec<Profile>> {
        ProfileRepository::new(&self.pool)
            .global_leaderboard(limit)
            .await
    }

    async fn league_rank_of(&self, user_id: Uuid) -> Result<i64> {
        ProfileRepository::new(&self.pool).league_rank_of(user_id).await
    }

    async fn global_rank_of(&self, user_id: Uuid) -> Result<i64> {
        ProfileRepository::new(&self.pool).global_rank_of(user_id).await
    }
}

#[derive(Clone)]
pub struct PgLeagueCatalog {
    pool: PgPool,
}

impl PgLeagueCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LeagueCatalog for PgLeagueCatalog {
    async fn all_tiers(&self) -> Result<Vec<League>> {
        LeagueRepository::new(&self.pool).list().await
    }
}

#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HistoryStore for PgHistoryStore {
    async fn save_snapshot(&self, record: &LeaderboardHistory) -> Result<bool> {
        HistoryRepository::new(&self.pool).insert(record).await
    }

    async fn query_by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        league_id: i32,
    ) -> Result<Vec<LeaderboardHistory>> {
        HistoryRepository::new(&self.pool)
            .find_by_period(period_start, period_end, league_id)
            .await
    }
}

#[derive(Clone)]
pub struct PgWatermarkStore {
    pool: PgPool,
    job: String,
}

impl PgWatermarkStore {
    pub fn new(pool: PgPool, job: impl Into<String>) -> Self {
        Self {
            pool,
            job: job.into(),
        }
    }
}

#[async_trait::async_trait]
impl WatermarkStore for PgWatermarkStore {
    async fn last_rotated_period(&self) -> Result<Option<DateTime<Utc>>> {
        let watermark = WatermarkRepository::new(&self.pool).find(&self.job).await?;
        Ok(watermark.map(|w| w.last_period_start))
    }

    async fn claim_period(&self, period_start: DateTime<Utc>) -> Result<bool> {
        WatermarkRepository::new(&self.pool)
            .claim(&self.job, period_start)
            .await
    }

    async fn complete_period(&self, period_start: DateTime<Utc>) -> Result<()> {
        WatermarkRepository::new(&self.pool)
            .complete(&self.job, period_start)
            .await
    }
}

/// Wire every rotation port to the same database
pub fn rotation_ports(db: &Database) -> RotationPorts {
    let pool = db.pool().clone();
    RotationPorts {
        profiles: Arc::new(PgProfileStore::new(pool.clone())),
        catalog: Arc::new(PgLeagueCatalog::new(pool.clone())),
        history: Arc::new(PgHistoryStore::new(pool.clone())),
        watermark: Arc::new(PgWatermarkStore::new(pool, WEEKLY_ROTATION_JOB)),
    }
}

/// Leaderboard views over the database
pub fn standings(db: &Database) -> Standings {
    let store = Arc::new(PgProfileStore::new(db.pool().clone()));
    Standings::new(store.clone(), store)
}
