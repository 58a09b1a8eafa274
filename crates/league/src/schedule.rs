use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::Serialize;

use crate::error::{Result, RotationError};

/// One accumulation window: `[start, end)`. `end` is the rotation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RotationPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for RotationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Weekly rotation boundary in UTC, e.g. Monday 00:00 with a one hour window
/// during which a poll may trigger the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSchedule {
    weekday: Weekday,
    hour: u32,
    window: Duration,
}

impl Default for RotationSchedule {
    fn default() -> Self {
        Self {
            weekday: Weekday::Mon,
            hour: 0,
            window: Duration::hours(1),
        }
    }
}

impl RotationSchedule {
    pub const PERIOD_DAYS: i64 = 7;

    pub fn new(weekday: Weekday, hour: u32, window: Duration) -> Result<Self> {
        if hour > 23 {
            return Err(RotationError::Configuration(format!(
                "rotation hour must be between 0 and 23, got {hour}"
            )));
        }
        if window <= Duration::zero() || window > Duration::days(Self::PERIOD_DAYS) {
            return Err(RotationError::Configuration(format!(
                "rotation window must be positive and at most {} days, got {}s",
                Self::PERIOD_DAYS,
                window.num_seconds()
            )));
        }

        Ok(Self {
            weekday,
            hour,
            window,
        })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Most recent boundary at or before `now`
    pub fn last_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let days_back = (today.weekday().num_days_from_monday() + 7
            - self.weekday.num_days_from_monday())
            % 7;

        let boundary = (today.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.hour))
            - Duration::days(i64::from(days_back)))
        .and_utc();

        if boundary > now {
            boundary - Duration::days(Self::PERIOD_DAYS)
        } else {
            boundary
        }
    }

    /// The period closed by the most recent boundary at or before `now`
    pub fn period_ending_at_or_before(&self, now: DateTime<Utc>) -> RotationPeriod {
        let end = self.last_boundary(now);
        RotationPeriod {
            start: end - Duration::days(Self::PERIOD_DAYS),
            end,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now < self.last_boundary(now) + self.window
    }

    /// The period to rotate when `now` falls inside a boundary window
    pub fn due_period(&self, now: DateTime<Utc>) -> Option<RotationPeriod> {
        self.is_due(now).then(|| self.period_ending_at_or_before(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // 2025-03-10 is a Monday
    #[test]
    fn test_boundary_same_day_inside_window() {
        let schedule = RotationSchedule::default();
        let now = at(2025, 3, 10, 0, 30);

        assert_eq!(schedule.last_boundary(now), at(2025, 3, 10, 0, 0));
        assert!(schedule.is_due(now));

        let period = schedule.due_period(now).unwrap();
        assert_eq!(period.start, at(2025, 3, 3, 0, 0));
        assert_eq!(period.end, at(2025, 3, 10, 0, 0));
    }

    #[test]
    fn test_exact_boundary_is_due() {
        let schedule = RotationSchedule::default();
        assert!(schedule.is_due(at(2025, 3, 10, 0, 0)));
    }

    #[test]
    fn test_window_end_is_exclusive() {
        let schedule = RotationSchedule::default();
        assert!(!schedule.is_due(at(2025, 3, 10, 1, 0)));
        assert!(schedule.due_period(at(2025, 3, 10, 1, 0)).is_none());
    }

    #[test]
    fn test_boundary_later_in_week() {
        let schedule = RotationSchedule::default();
        let now = at(2025, 3, 16, 23, 59);

        assert_eq!(schedule.last_boundary(now), at(2025, 3, 10, 0, 0));
        assert!(!schedule.is_due(now));
    }

    #[test]
    fn test_boundary_hour_not_reached_yet_today() {
        let schedule = RotationSchedule::new(Weekday::Wed, 18, Duration::hours(2)).unwrap();
        // Wednesday 2025-03-12, before 18:00
        let now = at(2025, 3, 12, 17, 0);

        assert_eq!(schedule.last_boundary(now), at(2025, 3, 5, 18, 0));
        assert!(!schedule.is_due(now));
        assert!(schedule.is_due(at(2025, 3, 12, 19, 59)));
    }

    #[test]
    fn test_periods_are_contiguous() {
        let schedule = RotationSchedule::default();
        let first = schedule.period_ending_at_or_before(at(2025, 3, 10, 0, 10));
        let second = schedule.period_ending_at_or_before(at(2025, 3, 17, 0, 10));

        assert_eq!(first.end, second.start);
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        assert!(RotationSchedule::new(Weekday::Mon, 24, Duration::hours(1)).is_err());
        assert!(RotationSchedule::new(Weekday::Mon, 0, Duration::zero()).is_err());
        assert!(RotationSchedule::new(Weekday::Mon, 0, Duration::days(8)).is_err());
    }
}
