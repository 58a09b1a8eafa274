use std::sync::Arc;

use serde::Serialize;
use storage::models::{LeaderboardHistory, Profile};
use tracing::{debug, warn};

use crate::schedule::RotationPeriod;
use crate::traits::HistoryStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub written: usize,
    /// Already present for the same natural key
    pub duplicates: usize,
    pub failed: usize,
}

/// Writes one immutable history row per ranked member. Best effort: a failed
/// write is logged and skipped.
#[derive(Clone)]
pub struct HistoryRecorder {
    history: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// `ranked` must be in rank order; position `i` is recorded as rank `i + 1`
    /// with the weekly score as read.
    pub async fn record(
        &self,
        period: &RotationPeriod,
        league_id: i32,
        ranked: &[Profile],
    ) -> SnapshotSummary {
        let mut summary = SnapshotSummary::default();

        for (rank, profile) in (1..).zip(ranked) {
            let record = LeaderboardHistory::new(
                profile.user_id,
                league_id,
                period.start,
                period.end,
                rank,
                profile.weekly_xp,
            );

            match self.history.save_snapshot(&record).await {
                Ok(true) => summary.written += 1,
                Ok(false) => {
                    debug!(
                        user_id = %profile.user_id,
                        league_id,
                        "Snapshot already recorded for this period"
                    );
                    summary.duplicates += 1;
                }
                Err(e) => {
                    warn!(
                        user_id = %profile.user_id,
                        league_id,
                        error = %e,
                        "Failed to save leaderboard snapshot"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
