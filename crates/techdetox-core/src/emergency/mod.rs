//! Emergency override: the password-gated way out of a lockdown.
//!
//! ## Flow
//!
//! ```text
//! AwaitingInput --unlock--> Granted --acknowledge--> Terminate
//!               \--unlock--> Denied  --acknowledge--> ReturnToLockdown
//!               \--unlock--> Rejected --acknowledge--> ReturnToLockdown
//! ```
//!
//! The credential is a publicly known value, not a secret. Blank input is
//! rejected before the credential is consulted at all.

mod termination;

pub use termination::{
    ExitStrategy, ProcessExit, ShutdownSignal, TerminationAttempt, TerminationChain,
    TerminationOutcome, MANUAL_CLOSE_MESSAGE,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::require_non_blank;
use crate::events::Event;

pub const DEFAULT_EMERGENCY_PASSWORD: &str = "1234";

pub const MSG_EMPTY_PASSWORD: &str = "Please enter a password";
pub const MSG_GRANTED: &str = "Emergency access granted. Closing the app...";
pub const MSG_DENIED: &str = "Emergency access denied.";

/// Decides whether a candidate password unlocks the override.
pub trait CredentialCheck {
    fn verify(&self, candidate: &str) -> bool;
}

/// Exact match against one fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPassword(String);

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl Default for FixedPassword {
    fn default() -> Self {
        Self::new(DEFAULT_EMERGENCY_PASSWORD)
    }
}

impl CredentialCheck for FixedPassword {
    fn verify(&self, candidate: &str) -> bool {
        candidate == self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AlertState {
    Hidden,
    Showing {
        message: String,
        kind: AlertKind,
        close_on_confirm: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideState {
    AwaitingInput,
    /// Blank input; the credential was not checked.
    Rejected,
    Granted,
    Denied,
}

/// Where control goes once the user dismisses the alert or cancels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideExit {
    /// Stay on the emergency screen.
    Stay,
    ReturnToLockdown,
    Terminate,
}

#[derive(Debug, Clone)]
pub struct EmergencyOverride<C = FixedPassword> {
    credential: C,
    state: OverrideState,
    alert: AlertState,
}

impl<C> EmergencyOverride<C> {
    pub fn state(&self) -> OverrideState {
        self.state
    }

    pub fn alert(&self) -> &AlertState {
        &self.alert
    }

    pub fn credential(&self) -> &C {
        &self.credential
    }
}

impl<C: CredentialCheck> EmergencyOverride<C> {
    pub fn new(credential: C) -> Self {
        Self {
            credential,
            state: OverrideState::AwaitingInput,
            alert: AlertState::Hidden,
        }
    }

    /// Evaluate a password attempt. Any previous alert is replaced.
    pub fn unlock(&mut self, input: &str, now: DateTime<Utc>) -> Event {
        if let Err(e) = require_non_blank("password", input) {
            let reason = e.to_string();
            self.show(OverrideState::Rejected, &reason, AlertKind::Error, false);
            return Event::UnlockRejected { reason, at: now };
        }

        if self.credential.verify(input) {
            info!("emergency access granted");
            self.show(OverrideState::Granted, MSG_GRANTED, AlertKind::Success, true);
            Event::UnlockGranted { at: now }
        } else {
            info!("emergency access denied");
            self.show(OverrideState::Denied, MSG_DENIED, AlertKind::Error, false);
            Event::UnlockDenied { at: now }
        }
    }

    /// Dismiss the current alert and report where control should go.
    pub fn acknowledge(&mut self) -> OverrideExit {
        let close_on_confirm = matches!(
            self.alert,
            AlertState::Showing {
                close_on_confirm: true,
                ..
            }
        );
        let exit = match self.state {
            OverrideState::Granted if close_on_confirm => OverrideExit::Terminate,
            OverrideState::Denied | OverrideState::Rejected => OverrideExit::ReturnToLockdown,
            _ => OverrideExit::Stay,
        };
        self.alert = AlertState::Hidden;
        self.state = OverrideState::AwaitingInput;
        exit
    }

    /// Leave without unlocking. Everything on this screen is discarded.
    pub fn cancel(&mut self) -> OverrideExit {
        self.alert = AlertState::Hidden;
        self.state = OverrideState::AwaitingInput;
        OverrideExit::ReturnToLockdown
    }

    fn show(&mut self, state: OverrideState, message: &str, kind: AlertKind, close_on_confirm: bool) {
        self.state = state;
        self.alert = AlertState::Showing {
            message: message.to_string(),
            kind,
            close_on_confirm,
        };
    }
}

impl Default for EmergencyOverride<FixedPassword> {
    fn default() -> Self {
        Self::new(FixedPassword::default())
    }
}
