//! In-memory implementations of the ports with failure injection, for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use storage::error::{Result, StorageError};
use storage::models::{LeaderboardHistory, League, Profile};
use uuid::Uuid;

use crate::traits::{
    HistoryStore, LeagueCatalog, ProfileStore, RotationPorts, StandingsStore, WatermarkStore,
};

pub fn user(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn profile(n: u128, league_id: i32, weekly_xp: i64) -> Profile {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Profile {
        profile_id: Uuid::from_u128(n + 1_000_000),
        user_id: user(n),
        display_name: format!("user-{n}"),
        avatar_url: None,
        total_xp: weekly_xp * 10,
        weekly_xp,
        level: 1,
        current_league_id: league_id,
        current_streak: 0,
        max_streak: 0,
        last_activity_at: None,
        created_at: created,
        updated_at: created,
    }
}

pub fn league(id: i32, ordinal: i32) -> League {
    League {
        league_id: id,
        slug: format!("league-{id}"),
        name: format!("League {id}"),
        order_index: ordinal,
        icon_url: None,
    }
}

fn injected() -> StorageError {
    StorageError::ConstraintViolation("injected failure".to_string())
}

#[derive(Default)]
struct State {
    leagues: Vec<League>,
    profiles: BTreeMap<Uuid, Profile>,
    history: Vec<LeaderboardHistory>,
    watermark: Option<DateTime<Utc>>,
    completed: Option<DateTime<Utc>>,
    catalog_unavailable: bool,
    failing_leagues: HashSet<i32>,
    failing_updates: HashSet<Uuid>,
    failing_snapshots: HashSet<Uuid>,
    failing_reset: bool,
    failing_completion: bool,
    reset_calls: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Store with `count` leagues; league ids equal `10 * ordinal`
    pub fn with_leagues(count: i32) -> Self {
        let store = Self::default();
        store.lock().leagues = (1..=count).map(|o| league(o * 10, o)).collect();
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn ports(&self) -> RotationPorts {
        RotationPorts {
            profiles: Arc::new(self.clone()),
            catalog: Arc::new(self.clone()),
            history: Arc::new(self.clone()),
            watermark: Arc::new(self.clone()),
        }
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.user_id, profile);
    }

    pub fn add_member(&self, n: u128, league_id: i32, weekly_xp: i64) -> Uuid {
        let p = profile(n, league_id, weekly_xp);
        let id = p.user_id;
        self.insert_profile(p);
        id
    }

    pub fn set_leagues(&self, leagues: Vec<League>) {
        self.lock().leagues = leagues;
    }

    pub fn grant_weekly_xp(&self, user_id: Uuid, amount: i64) {
        if let Some(p) = self.lock().profiles.get_mut(&user_id) {
            p.weekly_xp += amount;
            p.total_xp += amount;
        }
    }

    pub fn profile(&self, user_id: Uuid) -> Profile {
        self.lock().profiles[&user_id].clone()
    }

    pub fn league_of(&self, user_id: Uuid) -> i32 {
        self.profile(user_id).current_league_id
    }

    pub fn history(&self) -> Vec<LeaderboardHistory> {
        self.lock().history.clone()
    }

    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.lock().watermark
    }

    /// Start of the last period marked fully rotated
    pub fn completed(&self) -> Option<DateTime<Utc>> {
        self.lock().completed
    }

    pub fn claim(&self, period_start: DateTime<Utc>) {
        self.lock().watermark = Some(period_start);
    }

    pub fn reset_calls(&self) -> usize {
        self.lock().reset_calls
    }

    pub fn weekly_total(&self) -> i64 {
        self.lock().profiles.values().map(|p| p.weekly_xp).sum()
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.lock().catalog_unavailable = fail;
    }

    pub fn fail_league(&self, league_id: i32) {
        self.lock().failing_leagues.insert(league_id);
    }

    pub fn fail_update_for(&self, user_id: Uuid) {
        self.lock().failing_updates.insert(user_id);
    }

    pub fn fail_snapshot_for(&self, user_id: Uuid) {
        self.lock().failing_snapshots.insert(user_id);
    }

    pub fn fail_reset(&self, fail: bool) {
        self.lock().failing_reset = fail;
    }

    pub fn fail_completion(&self, fail: bool) {
        self.lock().failing_completion = fail;
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryStore {
    async fn ranked_members(&self, league_id: i32, limit: i64) -> Result<Vec<Profile>> {
        let state = self.lock();
        if state.failing_leagues.contains(&league_id) {
            return Err(injected());
        }

        let mut members: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| p.current_league_id == league_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            b.weekly_xp
                .cmp(&a.weekly_xp)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        members.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(members)
    }

    async fn update(&self, profile: &Profile) -> Result<()> {
        let mut state = self.lock();
        if state.failing_updates.contains(&profile.user_id) {
            return Err(injected());
        }
        if !state.leagues.iter().any(|l| l.league_id == profile.current_league_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "league {} does not exist",
                profile.current_league_id
            )));
        }

        let stored = state
            .profiles
            .get_mut(&profile.user_id)
            .ok_or(StorageError::NotFound)?;
        stored.current_league_id = profile.current_league_id;

        Ok(())
    }

    async fn reset_all_weekly_scores(&self) -> Result<u64> {
        let mut state = self.lock();
        state.reset_calls += 1;
        if state.failing_reset {
            return Err(injected());
        }

        let mut changed = 0;
        for p in state.profiles.values_mut() {
            if p.weekly_xp != 0 {
                p.weekly_xp = 0;
                changed += 1;
            }
        }

        Ok(changed)
    }
}

#[async_trait::async_trait]
impl LeagueCatalog for InMemoryStore {
    async fn all_tiers(&self) -> Result<Vec<League>> {
        let state = self.lock();
        if state.catalog_unavailable {
            return Err(injected());
        }

        let mut leagues = state.leagues.clone();
        leagues.sort_by_key(|l| l.order_index);
        Ok(leagues)
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryStore {
    async fn save_snapshot(&self, record: &LeaderboardHistory) -> Result<bool> {
        let mut state = self.lock();
        if state.failing_snapshots.contains(&record.user_id) {
            return Err(injected());
        }
        if state
            .history
            .iter()
            .any(|h| {
                h.user_id == record.user_id
                    && h.period_start == record.period_start
                    && h.period_end == record.period_end
                    && h.league_id == record.league_id
            })
        {
            return Ok(false);
        }

        state.history.push(record.clone());
        Ok(true)
    }

    async fn query_by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        league_id: i32,
    ) -> Result<Vec<LeaderboardHistory>> {
        let mut records: Vec<LeaderboardHistory> = self
            .lock()
            .history
            .iter()
            .filter(|h| {
                h.period_start == period_start
                    && h.period_end == period_end
                    && h.league_id == league_id
            })
            .cloned()
            .collect();
        records.sort_by_key(|h| h.rank);
        Ok(records)
    }
}

#[async_trait::async_trait]
impl WatermarkStore for InMemoryStore {
    async fn last_rotated_period(&self) -> Result<Option<DateTime<Utc>>> {
        let watermark = self.lock().watermark;
        // a database read is a round trip; let concurrent callers interleave
        tokio::task::yield_now().await;
        Ok(watermark)
    }

    async fn claim_period(&self, period_start: DateTime<Utc>) -> Result<bool> {
        let mut state = self.lock();
        if state.watermark.is_some_and(|claimed| claimed >= period_start) {
            return Ok(false);
        }
        state.watermark = Some(period_start);
        state.completed = None;
        Ok(true)
    }

    async fn complete_period(&self, period_start: DateTime<Utc>) -> Result<()> {
        let mut state = self.lock();
        if state.failing_completion {
            return Err(injected());
        }
        if state.watermark == Some(period_start) {
            state.completed = Some(period_start);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StandingsStore for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Profile> {
        self.lock()
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn global_leaders(&self, limit: i64) -> Result<Vec<Profile>> {
        let mut all: Vec<Profile> = self.lock().profiles.values().cloned().collect();
        all.sort_by(|a, b| {
            b.total_xp
                .cmp(&a.total_xp)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        all.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(all)
    }

    async fn league_rank_of(&self, user_id: Uuid) -> Result<i64> {
        let state = self.lock();
        let me = state.profiles.get(&user_id).ok_or(StorageError::NotFound)?;
        let ahead = state
            .profiles
            .values()
            .filter(|o| o.current_league_id == me.current_league_id)
            .filter(|o| {
                o.weekly_xp > me.weekly_xp
                    || (o.weekly_xp == me.weekly_xp && o.user_id < me.user_id)
            })
            .count();
        Ok(ahead as i64 + 1)
    }

    async fn global_rank_of(&self, user_id: Uuid) -> Result<i64> {
        let state = self.lock();
        let me = state.profiles.get(&user_id).ok_or(StorageError::NotFound)?;
        let ahead = state
            .profiles
            .values()
            .filter(|o| {
                o.total_xp > me.total_xp || (o.total_xp == me.total_xp && o.user_id < me.user_id)
            })
            .count();
        Ok(ahead as i64 + 1)
    }
}
