//! # Tech Detox Core Library
//!
//! Business logic for the Tech Detox lockdown timer. The user picks a
//! duration, a countdown blocks normal use until it runs out, and a
//! password-gated emergency override can end the session early. Front ends
//! (the `techdetox` CLI) are thin layers that feed input into a [`Session`]
//! and carry out the effects it returns.
//!
//! ## Architecture
//!
//! - **Lockdown**: a deadline-based countdown state machine plus the tokio
//!   tick scheduler that drives it
//! - **Emergency**: password check, alert state and the process termination
//!   fallback chain
//! - **Selector**: the duration entry screen
//! - **Navigation / Session**: the screen stack and the glue between screens
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`LockdownController`]: Core countdown state machine
//! - [`EmergencyOverride`]: Password-gated escape hatch
//! - [`Session`]: Screen routing and input handling
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod comms;
pub mod emergency;
pub mod error;
pub mod events;
pub mod lockdown;
pub mod navigation;
pub mod selector;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use comms::{open_dialer, open_messaging, CommsOutcome, Launcher, SystemLauncher};
pub use emergency::{
    AlertKind, AlertState, CredentialCheck, EmergencyOverride, FixedPassword, OverrideExit,
    OverrideState, TerminationChain, TerminationOutcome,
};
pub use error::{CapabilityError, ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use lockdown::{
    format_time, progress_percent, CountdownState, LockdownConfig, LockdownController,
    LockdownState, NavParams, TickScheduler, TimeDisplay,
};
pub use navigation::{Route, RouteName, Router};
pub use selector::DurationSelector;
pub use session::{Effect, Input, Screen, Session, SessionOptions};
pub use storage::Config;
