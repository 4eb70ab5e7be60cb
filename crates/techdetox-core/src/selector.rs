//! Duration selector: the start screen.
//!
//! Holds the raw text of the hours and minutes fields, gates the start behind
//! a confirmation step, and produces the navigation parameters for the
//! countdown screen. Parsing is permissive: anything that is not a
//! non-negative integer counts as zero, and minutes above 59 are accepted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lockdown::{LockdownConfig, NavParams};

pub const INITIAL_HOURS_TEXT: &str = "5";
pub const INITIAL_MINUTES_TEXT: &str = "00";
pub const CONFIRMATION_PROMPT: &str = "This will start your tech detox session.";

/// Integer-parse-or-zero.
pub fn parse_field(text: &str) -> u64 {
    text.trim().parse::<u64>().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSelector {
    hours_text: String,
    minutes_text: String,
    confirming: bool,
}

impl DurationSelector {
    pub fn new() -> Self {
        Self::with_text(INITIAL_HOURS_TEXT, INITIAL_MINUTES_TEXT)
    }

    pub fn with_text(hours: impl Into<String>, minutes: impl Into<String>) -> Self {
        Self {
            hours_text: hours.into(),
            minutes_text: minutes.into(),
            confirming: false,
        }
    }

    pub fn hours_text(&self) -> &str {
        &self.hours_text
    }

    pub fn minutes_text(&self) -> &str {
        &self.minutes_text
    }

    pub fn set_hours(&mut self, text: impl Into<String>) {
        self.hours_text = text.into();
    }

    pub fn set_minutes(&mut self, text: impl Into<String>) {
        self.minutes_text = text.into();
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    /// What the current fields would start, without starting it.
    pub fn preview(&self) -> LockdownConfig {
        LockdownConfig::new(parse_field(&self.hours_text), parse_field(&self.minutes_text))
    }

    pub fn request_start(&mut self) {
        self.confirming = true;
    }

    pub fn cancel_start(&mut self) {
        self.confirming = false;
    }

    /// Confirm the pending start. Returns `None` if no confirmation was open.
    pub fn confirm(&mut self) -> Option<NavParams> {
        if !self.confirming {
            return None;
        }
        self.confirming = false;
        Some(self.submit())
    }

    /// Build the parameter bundle from the current fields.
    pub fn submit(&self) -> NavParams {
        let hours = parse_field(&self.hours_text);
        let minutes = parse_field(&self.minutes_text);
        let total_minutes = hours.saturating_mul(60).saturating_add(minutes);
        debug!(hours, minutes, total_minutes, "duration submitted");
        NavParams {
            initial_hours: Some(hours.to_string()),
            initial_minutes: Some(minutes.to_string()),
            total_minutes: Some(total_minutes.to_string()),
        }
    }
}

impl Default for DurationSelector {
    fn default() -> Self {
        Self::new()
    }
}
