mod config;
mod controller;
mod display;
mod scheduler;

pub use config::{
    LockdownConfig, NavParams, DEFAULT_HOURS, DEFAULT_MINUTES, DEFAULT_TOTAL_MINUTES,
};
pub use controller::{CountdownState, LockdownController, LockdownState};
pub use display::{format_time, progress_percent, TimeDisplay};
pub use scheduler::{TickScheduler, DEFAULT_TICK_PERIOD};
