use techdetox_core::{open_dialer, open_messaging, CommsOutcome, Config, SystemLauncher};

pub fn call(number: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let outcome = open_dialer(&SystemLauncher, number.or(config.dialer_number()));
    report(&outcome)
}

pub fn message(number: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let outcome = open_messaging(&SystemLauncher, number.or(config.messaging_number()));
    report(&outcome)
}

fn report(outcome: &CommsOutcome) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
