//! Communication shortcuts available during a lockdown.
//!
//! Calls and messages stay reachable while everything else is blocked. Both
//! are thin wrappers over a [`Launcher`] that opens a `tel:` or `sms:` URI;
//! a missing handler becomes a message for the user, never an error.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CapabilityError;

pub const MSG_DIALER_UNAVAILABLE: &str = "Unable to open the phone dialer on this device.";
pub const MSG_MESSAGING_UNAVAILABLE: &str = "Unable to open the messaging app on this device.";

/// Opens a URI with whatever the platform has registered for it.
pub trait Launcher {
    fn open(&self, uri: &str) -> Result<(), CapabilityError>;
}

/// The desktop default, backed by the `open` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, uri: &str) -> Result<(), CapabilityError> {
        open::that(uri).map_err(|e| CapabilityError::failed(format!("open {uri}"), e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommsOutcome {
    Opened { uri: String },
    Unavailable { message: String },
}

pub fn dialer_uri(number: Option<&str>) -> String {
    format!("tel:{}", sanitize_number(number))
}

pub fn messaging_uri(number: Option<&str>) -> String {
    format!("sms:{}", sanitize_number(number))
}

pub fn open_dialer(launcher: &dyn Launcher, number: Option<&str>) -> CommsOutcome {
    launch(launcher, dialer_uri(number), MSG_DIALER_UNAVAILABLE)
}

pub fn open_messaging(launcher: &dyn Launcher, number: Option<&str>) -> CommsOutcome {
    launch(launcher, messaging_uri(number), MSG_MESSAGING_UNAVAILABLE)
}

fn launch(launcher: &dyn Launcher, uri: String, fallback: &str) -> CommsOutcome {
    match launcher.open(&uri) {
        Ok(()) => {
            info!(%uri, "opened communication shortcut");
            CommsOutcome::Opened { uri }
        }
        Err(e) => {
            warn!(%uri, error = %e, "communication shortcut unavailable");
            CommsOutcome::Unavailable {
                message: fallback.to_string(),
            }
        }
    }
}

/// Keep only characters a dial string may contain.
fn sanitize_number(number: Option<&str>) -> String {
    number
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#'))
        .collect()
}
