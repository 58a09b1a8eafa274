use std::collections::HashSet;
use std::sync::Arc;

use storage::error::Result;
use storage::models::Profile;

use crate::traits::ProfileStore;

/// Members read per league during a rotation
pub const DEFAULT_RANK_LIMIT: i64 = 100;

/// Produces the ranked view of a league: weekly score descending, ties broken
/// by ascending user id.
#[derive(Clone)]
pub struct LeaderboardReader {
    profiles: Arc<dyn ProfileStore>,
}

impl LeaderboardReader {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Rank members of `league_id`, at most `limit` of them.
    ///
    /// The store reads the page in one statement. The order is re-applied here
    /// and duplicate users dropped, so rank assignment never depends on the
    /// storage engine's row order.
    pub async fn rank(&self, league_id: i32, limit: i64) -> Result<Vec<Profile>> {
        let mut members = self.profiles.ranked_members(league_id, limit).await?;

        sort_by_standing(&mut members, |p| p.weekly_xp);

        let mut seen = HashSet::with_capacity(members.len());
        members.retain(|p| seen.insert(p.user_id));
        members.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(members)
    }
}

/// Score descending, then user id ascending
pub(crate) fn sort_by_standing(profiles: &mut [Profile], score: impl Fn(&Profile) -> i64) {
    profiles.sort_by(|a, b| {
        score(b)
            .cmp(&score(a))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryStore, profile, user};

    /// Returns a fixed page regardless of the league, in whatever order it was given
    struct FixedPage(Vec<Profile>);

    #[async_trait::async_trait]
    impl ProfileStore for FixedPage {
        async fn ranked_members(&self, _league_id: i32, _limit: i64) -> Result<Vec<Profile>> {
            Ok(self.0.clone())
        }

        async fn update(&self, _profile: &Profile) -> Result<()> {
            Ok(())
        }

        async fn reset_all_weekly_scores(&self) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_rank_orders_by_weekly_score() {
        let store = InMemoryStore::with_leagues(2);
        store.add_member(1, 10, 5);
        store.add_member(2, 10, 50);
        store.add_member(3, 10, 20);
        store.add_member(4, 20, 999);

        let reader = LeaderboardReader::new(Arc::new(store));
        let ranked = reader.rank(10, 100).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![user(2), user(3), user(1)]);
    }

    #[tokio::test]
    async fn test_ties_broken_by_user_id() {
        let page = vec![profile(9, 10, 40), profile(3, 10, 40), profile(5, 10, 70)];
        let reader = LeaderboardReader::new(Arc::new(FixedPage(page)));

        let ranked = reader.rank(10, 100).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![user(5), user(3), user(9)]);
    }

    #[tokio::test]
    async fn test_duplicate_rows_are_dropped() {
        let page = vec![profile(1, 10, 40), profile(2, 10, 30), profile(1, 10, 40)];
        let reader = LeaderboardReader::new(Arc::new(FixedPage(page)));

        let ranked = reader.rank(10, 100).await.unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let store = InMemoryStore::with_leagues(1);
        for n in 1..=30 {
            store.add_member(n, 10, n as i64);
        }

        let reader = LeaderboardReader::new(Arc::new(store));
        let ranked = reader.rank(10, 7).await.unwrap();

        assert_eq!(ranked.len(), 7);
        assert_eq!(ranked[0].user_id, user(30));
    }
}
