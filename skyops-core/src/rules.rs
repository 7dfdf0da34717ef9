use chrono::Duration;
use serde::Deserialize;

/// Tunable scheduling limits. Defaults match the production rules: flights
/// last between 30 minutes and 24 hours, listings return at most 100 rows.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SchedulingRules {
    #[serde(default = "default_min_flight_minutes")]
    pub min_flight_minutes: i64,
    #[serde(default = "default_max_flight_minutes")]
    pub max_flight_minutes: i64,
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_page_size")]
    pub max_page_size: i64,
}

fn default_min_flight_minutes() -> i64 { 30 }
fn default_max_flight_minutes() -> i64 { 24 * 60 }
fn default_page_size() -> i64 { 100 }

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            min_flight_minutes: default_min_flight_minutes(),
            max_flight_minutes: default_max_flight_minutes(),
            default_page_size: default_page_size(),
            max_page_size: default_page_size(),
        }
    }
}

/// A rule set that cannot be applied consistently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRules {
    #[error("min_flight_minutes must be at least 1, got {0}")]
    MinDuration(i64),
    #[error("min_flight_minutes ({min}) exceeds max_flight_minutes ({max})")]
    DurationBounds { min: i64, max: i64 },
    #[error("max_page_size must be at least 1, got {0}")]
    MaxPageSize(i64),
    #[error("default_page_size ({default}) must be between 0 and max_page_size ({max})")]
    DefaultPageSize { default: i64, max: i64 },
}

impl SchedulingRules {
    pub fn validate(&self) -> Result<(), InvalidRules> {
        if self.min_flight_minutes < 1 {
            return Err(InvalidRules::MinDuration(self.min_flight_minutes));
        }
        if self.min_flight_minutes > self.max_flight_minutes {
            return Err(InvalidRules::DurationBounds {
                min: self.min_flight_minutes,
                max: self.max_flight_minutes,
            });
        }
        if self.max_page_size < 1 {
            return Err(InvalidRules::MaxPageSize(self.max_page_size));
        }
        if !(0..=self.max_page_size).contains(&self.default_page_size) {
            return Err(InvalidRules::DefaultPageSize {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }

    pub fn min_duration(&self) -> Duration {
        Duration::minutes(self.min_flight_minutes)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::minutes(self.max_flight_minutes)
    }
}
