//! Lockdown duration and the navigation parameter bundle that carries it.

use serde::{Deserialize, Serialize};

/// Hours used when the navigation bundle has no usable value.
pub const DEFAULT_HOURS: u64 = 5;
/// Minutes used when the navigation bundle has no usable value.
pub const DEFAULT_MINUTES: u64 = 0;
/// Total minutes used when the navigation bundle has no usable value.
pub const DEFAULT_TOTAL_MINUTES: u64 = DEFAULT_HOURS * 60 + DEFAULT_MINUTES;

/// Immutable lockdown duration.
///
/// `initial_minutes` is always in `0..60`; larger minute inputs are rolled
/// into `initial_hours` when the config is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockdownConfig {
    pub initial_hours: u64,
    pub initial_minutes: u64,
    pub total_seconds: u64,
}

impl LockdownConfig {
    pub fn new(hours: u64, minutes: u64) -> Self {
        let total_minutes = hours.saturating_mul(60).saturating_add(minutes);
        Self::from_total_minutes(total_minutes)
    }

    pub fn from_total_minutes(total_minutes: u64) -> Self {
        Self {
            initial_hours: total_minutes / 60,
            initial_minutes: total_minutes % 60,
            total_seconds: total_minutes.saturating_mul(60),
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_seconds / 60
    }

    /// Build from navigation parameters, substituting defaults for anything
    /// absent or unparseable. Never fails.
    ///
    /// A valid `total_minutes` wins; otherwise the total is derived from the
    /// (possibly defaulted) hours and minutes.
    pub fn from_params(params: &NavParams) -> Self {
        let hours = parse_param(params.initial_hours.as_deref()).unwrap_or(DEFAULT_HOURS);
        let minutes = parse_param(params.initial_minutes.as_deref()).unwrap_or(DEFAULT_MINUTES);
        match parse_param(params.total_minutes.as_deref()) {
            Some(total) => Self::from_total_minutes(total),
            None => Self::new(hours, minutes),
        }
    }

    pub fn to_params(&self) -> NavParams {
        NavParams {
            initial_hours: Some(self.initial_hours.to_string()),
            initial_minutes: Some(self.initial_minutes.to_string()),
            total_minutes: Some(self.total_minutes().to_string()),
        }
    }
}

impl Default for LockdownConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOURS, DEFAULT_MINUTES)
    }
}

/// String-typed parameters handed from the selector to the countdown screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavParams {
    #[serde(default)]
    pub initial_hours: Option<String>,
    #[serde(default)]
    pub initial_minutes: Option<String>,
    #[serde(default)]
    pub total_minutes: Option<String>,
}

fn parse_param(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}
