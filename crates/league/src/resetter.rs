use std::sync::Arc;

use storage::error::Result;
use tracing::info;

use crate::traits::ProfileStore;

/// Zeroes the weekly accumulator of every profile. The write is absolute, so
/// running it twice leaves the same state.
#[derive(Clone)]
pub struct AccumulatorResetter {
    profiles: Arc<dyn ProfileStore>,
}

impl AccumulatorResetter {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub async fn reset_all(&self) -> Result<u64> {
        let changed = self.profiles.reset_all_weekly_scores().await?;
        info!(profiles_reset = changed, "Weekly scores reset");
        Ok(changed)
    }
}
