use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::LeaderboardHistory;

/// Rotation period to look up. `period_end` defaults to one week after
/// `period_start`.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_period"))]
pub struct HistoryQuery {
    pub period_start: DateTime<Utc>,
    pub period_end: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    pub fn period_end(&self) -> DateTime<Utc> {
        self.period_end
            .unwrap_or_else(|| self.period_start + Duration::days(7))
    }
}

fn validate_period(query: &HistoryQuery) -> Result<(), ValidationError> {
    if query.period_end() <= query.period_start {
        let mut error = ValidationError::new("period_order");
        error.message = Some("period_end must be after period_start".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub user_id: Uuid,
    pub league_id: i32,
    pub rank: i32,
    pub weekly_xp: i64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl From<LeaderboardHistory> for HistoryEntryResponse {
    fn from(record: LeaderboardHistory) -> Self {
        Self {
            user_id: record.user_id,
            league_id: record.league_id,
            rank: record.rank,
            weekly_xp: record.weekly_xp,
            period_start: record.period_start,
            period_end: record.period_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_end_defaults_to_one_week() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let query = HistoryQuery {
            period_start: start,
            period_end: None,
        };
        assert_eq!(query.period_end(), start + Duration::days(7));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_period_end_before_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let query = HistoryQuery {
            period_start: start,
            period_end: Some(start - Duration::days(7)),
        };
        assert!(query.validate().is_err());
    }
}
