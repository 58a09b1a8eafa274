use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

/// Result-size limit shared by the leaderboard views.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct LimitParams {
    pub limit: Option<u32>,
}

impl LimitParams {
    pub fn new(limit: Option<u32>) -> Self {
        Self { limit }
    }

    /// Effective limit: missing or zero falls back to the default, anything
    /// above the cap is clamped to it.
    pub fn limit(&self) -> u32 {
        match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => n.min(MAX_LIMIT),
        }
    }
}
