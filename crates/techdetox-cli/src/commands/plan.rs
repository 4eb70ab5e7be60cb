use clap::Args;
use serde::Serialize;
use techdetox_core::{format_time, Config, DurationSelector, LockdownConfig, NavParams};

#[derive(Args)]
pub struct PlanArgs {
    /// Hours (non-numeric text counts as 0)
    #[arg(long)]
    pub hours: Option<String>,
    /// Minutes (non-numeric text counts as 0)
    #[arg(long)]
    pub minutes: Option<String>,
}

#[derive(Serialize)]
struct Plan {
    config: LockdownConfig,
    display: String,
    params: NavParams,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = Config::load_or_default();
    let selector = DurationSelector::with_text(
        args.hours
            .unwrap_or_else(|| defaults.lockdown.default_hours.to_string()),
        args.minutes
            .unwrap_or_else(|| defaults.lockdown.default_minutes.to_string()),
    );

    let params = selector.submit();
    let config = LockdownConfig::from_params(&params);
    let plan = Plan {
        config,
        display: format_time(config.total_seconds).to_string(),
        params,
    };
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
