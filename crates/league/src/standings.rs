//! Read-only leaderboard views served to API callers.

use std::sync::Arc;

use storage::dto::leaderboard::{LeaderboardEntry, LeaderboardResponse};
use storage::error::{Result, StorageError};
use storage::models::Profile;
use tracing::debug;
use uuid::Uuid;

use crate::leaderboard::LeaderboardReader;
use crate::traits::{ProfileStore, StandingsStore};

#[derive(Clone)]
pub struct Standings {
    reader: LeaderboardReader,
    store: Arc<dyn StandingsStore>,
}

impl Standings {
    pub fn new(profiles: Arc<dyn ProfileStore>, store: Arc<dyn StandingsStore>) -> Self {
        Self {
            reader: LeaderboardReader::new(profiles),
            store,
        }
    }

    /// League-scoped weekly view. Shows `league_id` when given, otherwise the
    /// requester's current league. Fails with `NotFound` when neither resolves.
    pub async fn weekly(
        &self,
        requester: Option<Uuid>,
        league_id: Option<i32>,
        limit: u32,
    ) -> Result<LeaderboardResponse> {
        let requester_profile = match requester {
            Some(user_id) => match self.store.find_by_user(user_id).await {
                Ok(profile) => Some(profile),
                Err(StorageError::NotFound) if league_id.is_some() => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let league_id = league_id
            .or_else(|| requester_profile.as_ref().map(|p| p.current_league_id))
            .ok_or(StorageError::NotFound)?;

        let ranked = self.reader.rank(league_id, i64::from(limit)).await?;
        let leaderboard = entries(&ranked, |p| p.weekly_xp);

        let user_rank = match requester_profile {
            Some(me) if me.current_league_id == league_id => {
                match page_rank(&leaderboard, me.user_id) {
                    Some(rank) => Some(rank),
                    None => known_rank(self.store.league_rank_of(me.user_id).await, me.user_id),
                }
            }
            _ => None,
        };

        Ok(LeaderboardResponse {
            leaderboard,
            user_rank,
        })
    }

    /// All-time view across every league, by lifetime score
    pub async fn global(&self, requester: Option<Uuid>, limit: u32) -> Result<LeaderboardResponse> {
        let leaders = self.store.global_leaders(i64::from(limit)).await?;
        let leaderboard = entries(&leaders, |p| p.total_xp);

        let user_rank = match requester {
            Some(user_id) => match page_rank(&leaderboard, user_id) {
                Some(rank) => Some(rank),
                None => known_rank(self.store.global_rank_of(user_id).await, user_id),
            },
            None => None,
        };

        Ok(LeaderboardResponse {
            leaderboard,
            user_rank,
        })
    }
}

/// A requester whose rank cannot be computed gets no rank, not an error
fn known_rank(rank: Result<i64>, user_id: Uuid) -> Option<i64> {
    rank.inspect_err(|e| debug!(%user_id, error = %e, "Requester rank unavailable"))
        .ok()
}

fn entries(profiles: &[Profile], score: impl Fn(&Profile) -> i64) -> Vec<LeaderboardEntry> {
    (1..)
        .zip(profiles)
        .map(|(rank, p)| LeaderboardEntry::new(rank, p, score(p)))
        .collect()
}

fn page_rank(page: &[LeaderboardEntry], user_id: Uuid) -> Option<i64> {
    page.iter().find(|e| e.user_id == user_id).map(|e| e.rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryStore, user};

    fn standings(store: &InMemoryStore) -> Standings {
        Standings::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::with_leagues(2);
        store.add_member(1, 10, 30);
        store.add_member(2, 10, 80);
        store.add_member(3, 10, 55);
        store.add_member(4, 10, 10);
        store.add_member(5, 20, 500);
        store
    }

    #[tokio::test]
    async fn test_weekly_uses_requester_league() {
        let store = seeded();

        let view = standings(&store).weekly(Some(user(1)), None, 50).await.unwrap();

        let ids: Vec<_> = view.leaderboard.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![user(2), user(3), user(1), user(4)]);
        assert_eq!(view.leaderboard[0].rank, 1);
        assert_eq!(view.leaderboard[0].score, 80);
        assert_eq!(view.leaderboard[0].league_id, 10);
        assert_eq!(view.user_rank, Some(3));
    }

    #[tokio::test]
    async fn test_weekly_rank_outside_page_is_computed() {
        let store = seeded();

        let view = standings(&store).weekly(Some(user(4)), None, 2).await.unwrap();

        assert_eq!(view.leaderboard.len(), 2);
        assert_eq!(view.user_rank, Some(4));
    }

    #[tokio::test]
    async fn test_weekly_explicit_league_for_other_member() {
        let store = seeded();

        let view = standings(&store).weekly(Some(user(1)), Some(20), 50).await.unwrap();

        assert_eq!(view.leaderboard.len(), 1);
        assert_eq!(view.leaderboard[0].user_id, user(5));
        assert_eq!(view.user_rank, None);
    }

    #[tokio::test]
    async fn test_weekly_unknown_requester_without_league_is_not_found() {
        let store = seeded();

        let result = standings(&store).weekly(Some(user(99)), None, 50).await;

        assert!(matches!(result, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_weekly_unknown_requester_with_league() {
        let store = seeded();

        let view = standings(&store).weekly(Some(user(99)), Some(10), 50).await.unwrap();

        assert_eq!(view.leaderboard.len(), 4);
        assert_eq!(view.user_rank, None);
    }

    #[tokio::test]
    async fn test_global_uses_lifetime_score() {
        let store = seeded();

        let view = standings(&store).global(Some(user(4)), 2).await.unwrap();

        assert_eq!(view.leaderboard[0].user_id, user(5));
        assert_eq!(view.leaderboard[0].score, 5000);
        assert_eq!(view.leaderboard[1].user_id, user(2));
        assert_eq!(view.user_rank, Some(5));
    }

    #[tokio::test]
    async fn test_global_without_requester() {
        let store = seeded();

        let view = standings(&store).global(None, 50).await.unwrap();

        assert_eq!(view.leaderboard.len(), 5);
        assert_eq!(view.user_rank, None);
    }
}
