use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Weekday;
use league::{RotationSchedule, RotationSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub rotation: RotationConfig,
}

/// Settings for the in-process weekly rotation job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    pub enabled: bool,
    pub poll_interval: Duration,
    pub weekday: Weekday,
    pub hour: u32,
    pub window: Duration,
    pub rank_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            host: var("HOST").context("Cannot load HOST env variable")?,
            port: var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: var("DATABASE_URL").context("Cannot load DATABASE_URL env variable")?,
            rotation: RotationConfig::from_lookup(&var)?,
        })
    }
}

impl RotationConfig {
    fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            enabled: parse_or(var, "ROTATION_ENABLED", true)?,
            poll_interval: Duration::from_secs(parse_or(var, "ROTATION_POLL_INTERVAL_SECS", 3600)?),
            weekday: parse_or(var, "ROTATION_WEEKDAY", Weekday::Mon)?,
            hour: parse_or(var, "ROTATION_HOUR", 0)?,
            window: Duration::from_secs(parse_or(var, "ROTATION_WINDOW_SECS", 3600)?),
            rank_limit: parse_or(var, "ROTATION_RANK_LIMIT", 100)?,
        })
    }
}

impl RotationConfig {
    /// Validated schedule and settings for the rotation job
    pub fn build(&self) -> Result<(RotationSchedule, RotationSettings)> {
        let window = chrono::Duration::from_std(self.window)
            .context("ROTATION_WINDOW_SECS is out of range")?;
        let schedule = RotationSchedule::new(self.weekday, self.hour, window)
            .context("Invalid ROTATION_WEEKDAY, ROTATION_HOUR or ROTATION_WINDOW_SECS")?;
        let settings = RotationSettings::new(self.poll_interval, self.rank_limit)
            .context("Invalid ROTATION_POLL_INTERVAL_SECS or ROTATION_RANK_LIMIT")?;
        settings
            .check_schedule(&schedule)
            .context("ROTATION_POLL_INTERVAL_SECS must not exceed ROTATION_WINDOW_SECS")?;

        Ok((schedule, settings))
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {:?}", key, raw, e)),
        None => Ok(default),
    }
}
