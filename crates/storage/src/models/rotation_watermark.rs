use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Durable claim on the last rotation period of a job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RotationWatermark {
    pub job: String,
    pub last_period_start: DateTime<Utc>,
    pub claimed_at: DateTime<Utc>,
    /// `None` while the claimed period is in progress, or if it was abandoned
    pub completed_at: Option<DateTime<Utc>>,
}
