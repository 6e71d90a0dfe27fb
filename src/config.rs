use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ChoreError;

pub const WINDOW_DAYS_ENV: &str = "CHOREBOARD_GENERATION_WINDOW_DAYS";
pub const INTERVAL_MINUTES_ENV: &str = "CHOREBOARD_GENERATOR_INTERVAL_MINUTES";
pub const OFFER_DEADLINE_HOURS_ENV: &str = "CHOREBOARD_OFFER_DEADLINE_HOURS";

/// Default deadline for single-task offers whose rule does not set one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePolicy {
    #[default]
    NoDeadline,
    ExpireAfterHours(u32),
}

impl DeadlinePolicy {
    pub fn deadline_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::NoDeadline => None,
            Self::ExpireAfterHours(hours) => Some(now + chrono::Duration::hours(i64::from(*hours))),
        }
    }
}

/// Engine settings loaded from environment variables.
///
/// | Env Var                                  | Default |
/// |------------------------------------------|---------|
/// | `CHOREBOARD_GENERATION_WINDOW_DAYS`      | `7`     |
/// | `CHOREBOARD_GENERATOR_INTERVAL_MINUTES`  | `60`    |
/// | `CHOREBOARD_OFFER_DEADLINE_HOURS`        | unset   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Days generated per run, starting today.
    pub generation_window_days: u32,
    /// Pause between scheduler iterations.
    pub generator_interval_minutes: u32,
    pub offer_deadline: DeadlinePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_window_days: 7,
            generator_interval_minutes: 60,
            offer_deadline: DeadlinePolicy::NoDeadline,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ChoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys take their defaults;
    /// anything else must be a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChoreError> {
        let defaults = Self::default();
        let generation_window_days =
            positive(&lookup, WINDOW_DAYS_ENV)?.unwrap_or(defaults.generation_window_days);
        let generator_interval_minutes =
            positive(&lookup, INTERVAL_MINUTES_ENV)?.unwrap_or(defaults.generator_interval_minutes);
        let offer_deadline = match positive(&lookup, OFFER_DEADLINE_HOURS_ENV)? {
            Some(hours) => DeadlinePolicy::ExpireAfterHours(hours),
            None => DeadlinePolicy::NoDeadline,
        };
        Ok(Self {
            generation_window_days,
            generator_interval_minutes,
            offer_deadline,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.generator_interval_minutes) * 60)
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u32>, ChoreError> {
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value >= 1 => Ok(Some(value)),
        _ => Err(ChoreError::config(format!(
            "{key} must be an integer >= 1, got '{raw}'"
        ))),
    }
}
