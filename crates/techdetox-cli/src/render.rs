//! Plain-text rendering of the session screens.

use techdetox_core::selector::CONFIRMATION_PROMPT;
use techdetox_core::{format_time, AlertKind, AlertState, LockdownController, Screen};

const BAR_WIDTH: usize = 20;

pub const SELECTOR_HELP: &str = "Commands: hours <n>, minutes <n>, start, quit";
pub const LOCKDOWN_HELP: &str = "Commands: emergency, call, message, status";
pub const EMERGENCY_HELP: &str = "Enter the emergency password (or :cancel to go back)";

/// The one-line summary of a screen shown after every navigation.
pub fn screen<C>(screen: &Screen<C>) -> String {
    match screen {
        Screen::Selector(selector) if selector.is_confirming() => {
            format!(
                "{CONFIRMATION_PROMPT} Start a {} lockdown? [y/n]",
                format_time(selector.preview().total_seconds)
            )
        }
        Screen::Selector(selector) => format!(
            "Lockdown length: {}h {}m. {SELECTOR_HELP}",
            selector.hours_text(),
            selector.minutes_text()
        ),
        Screen::Lockdown(controller) => format!("{}\n{LOCKDOWN_HELP}", status_line(controller)),
        Screen::Emergency(emergency) => {
            alert(emergency.alert()).unwrap_or_else(|| EMERGENCY_HELP.to_string())
        }
    }
}

/// `HH:MM:SS [#####...............]  25.0%`
pub fn status_line(controller: &LockdownController) -> String {
    let pct = controller.progress_percent();
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{} [{}{}] {:>5.1}%",
        controller.display(),
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        pct
    )
}

pub fn alert(state: &AlertState) -> Option<String> {
    match state {
        AlertState::Hidden => None,
        AlertState::Showing { message, kind, .. } => {
            let label = match kind {
                AlertKind::Success => "OK",
                AlertKind::Error => "!!",
            };
            Some(format!("[{label}] {message} (press Enter)"))
        }
    }
}
