use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lockdown::LockdownState;

/// Every state change in the system produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    LockdownStarted {
        total_secs: u64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    LockdownPaused {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    LockdownResumed {
        seconds_remaining: u64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted exactly once per lockdown.
    LockdownExpired {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user left the countdown for the emergency screen.
    OverrideRequested {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Password input was blank; the credential was never checked.
    UnlockRejected {
        reason: String,
        at: DateTime<Utc>,
    },
    UnlockGranted {
        at: DateTime<Utc>,
    },
    UnlockDenied {
        at: DateTime<Utc>,
    },
    TerminationAttempted {
        strategy: String,
        succeeded: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: LockdownState,
        seconds_remaining: u64,
        total_secs: u64,
        display: String,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let at = Utc::now();
        let json = serde_json::to_value(Event::UnlockDenied { at }).unwrap();
        assert_eq!(json["type"], "UnlockDenied");

        let json = serde_json::to_value(Event::LockdownExpired { total_secs: 60, at }).unwrap();
        assert_eq!(json["type"], "LockdownExpired");
        assert_eq!(json["total_secs"], 60);
    }
}
