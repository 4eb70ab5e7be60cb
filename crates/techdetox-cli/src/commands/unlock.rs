use chrono::Utc;
use serde::Serialize;
use techdetox_core::{AlertState, Config, EmergencyOverride, Event, FixedPassword, OverrideState};

#[derive(Serialize)]
struct UnlockReport<'a> {
    state: OverrideState,
    alert: &'a AlertState,
    event: Event,
}

/// Evaluate a password against the configured one. Nothing is terminated.
pub fn run(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut emergency = EmergencyOverride::new(FixedPassword::new(config.emergency.password));
    let event = emergency.unlock(password, Utc::now());

    let report = UnlockReport {
        state: emergency.state(),
        alert: emergency.alert(),
        event,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
