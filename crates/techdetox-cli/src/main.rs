use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "techdetox", version, about = "Tech Detox lockdown timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive lockdown session
    Start(commands::start::StartArgs),
    /// Show what a lockdown of the given length would look like
    Plan(commands::plan::PlanArgs),
    /// Check an emergency password without starting a session
    Unlock {
        /// Password to check
        #[arg(default_value = "")]
        password: String,
    },
    /// Open the phone dialer
    Call {
        /// Number to pre-fill (defaults to contacts.dialer_number)
        number: Option<String>,
    },
    /// Open the messaging app
    Message {
        /// Number to pre-fill (defaults to contacts.messaging_number)
        number: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TECHDETOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Start(args) => commands::start::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Unlock { password } => commands::unlock::run(&password),
        Commands::Call { number } => commands::contact::call(number.as_deref()),
        Commands::Message { number } => commands::contact::message(number.as_deref()),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
