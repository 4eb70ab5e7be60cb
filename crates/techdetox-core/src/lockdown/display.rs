//! Derived display fields for the countdown screen.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::LockdownConfig;

/// Remaining time split into zero-padded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDisplay {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// Split `seconds_remaining` into hours, minutes and seconds.
///
/// Each field is padded to at least two digits; hours may grow wider.
pub fn format_time(seconds_remaining: u64) -> TimeDisplay {
    let hours = seconds_remaining / 3600;
    let minutes = (seconds_remaining % 3600) / 60;
    let seconds = seconds_remaining % 60;
    TimeDisplay {
        hours: format!("{hours:02}"),
        minutes: format!("{minutes:02}"),
        seconds: format!("{seconds:02}"),
    }
}

/// Elapsed share of the lockdown, 0.0 ..= 100.0.
///
/// A zero-length lockdown counts as complete.
pub fn progress_percent(config: &LockdownConfig, seconds_remaining: u64) -> f64 {
    let total = config.total_seconds;
    if total == 0 {
        return 100.0;
    }
    let elapsed = total.saturating_sub(seconds_remaining);
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
