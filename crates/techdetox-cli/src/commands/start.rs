use std::io::Write;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use techdetox_core::emergency::{ProcessExit, ShutdownSignal};
use techdetox_core::{
    open_dialer, open_messaging, AlertState, Clock, CommsOutcome, Config, Effect, Input, RouteName,
    Screen, Session, SessionOptions, SystemClock, SystemLauncher, TerminationChain, TerminationOutcome,
    TickScheduler,
};

use crate::render;

#[derive(Args)]
pub struct StartArgs {
    /// Hours (defaults to lockdown.default_hours)
    #[arg(long, allow_hyphen_values = true)]
    pub hours: Option<String>,
    /// Minutes (defaults to lockdown.default_minutes)
    #[arg(long, allow_hyphen_values = true)]
    pub minutes: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// A line typed by the user, interpreted for the current screen.
#[derive(Debug, PartialEq)]
enum Command {
    Input(Input),
    Status,
    Help(&'static str),
    Quit,
    Nothing,
}

pub fn run(args: StartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let options = SessionOptions {
        hours_text: args
            .hours
            .unwrap_or_else(|| config.lockdown.default_hours.to_string()),
        minutes_text: args
            .minutes
            .unwrap_or_else(|| config.lockdown.default_minutes.to_string()),
        confirm_start: config.lockdown.confirm_start && !args.yes,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(&config, options));
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    Ok(())
}

async fn drive(config: &Config, options: SessionOptions) {
    let (signal, shutdown) = ShutdownSignal::new();
    let mut console = Console {
        config,
        session: Session::new(config.emergency_credential(), options),
        ticker: TickScheduler::new(config.tick_interval()),
        chain: TerminationChain::new()
            .with(signal)
            .with(ProcessExit::default()),
        clock: SystemClock,
        inline: false,
        finished: false,
    };

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    let mut stdin_open = true;

    console.handle(Input::RequestStart, true);
    while !console.finished && !*shutdown.borrow() {
        tokio::select! {
            _ = console.ticker.next() => console.handle(Input::Tick, false),
            read = stdin.read_until(b'\n', &mut buf), if stdin_open => match read {
                Ok(0) => {
                    stdin_open = false;
                    console.stdin_closed();
                }
                Ok(_) => {
                    let line = decode_line(&buf);
                    buf.clear();
                    console.command(&line);
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed; no further input");
                    stdin_open = false;
                    console.stdin_closed();
                }
            },
        }
    }
    console.end_line();
}

/// Input bytes are never fatal: invalid UTF-8 is replaced, not rejected.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

struct Console<'a> {
    config: &'a Config,
    session: Session,
    ticker: TickScheduler,
    chain: TerminationChain,
    clock: SystemClock,
    /// The last thing printed was an in-place status line.
    inline: bool,
    finished: bool,
}

impl Console<'_> {
    fn command(&mut self, line: &str) {
        match parse_command(self.session.screen(), line) {
            Command::Input(input) => self.handle(input, true),
            Command::Status => {
                if let Screen::Lockdown(controller) = self.session.screen() {
                    let line = render::status_line(controller);
                    self.say(&line);
                }
            }
            Command::Help(text) => self.say(text),
            Command::Quit => self.finished = true,
            Command::Nothing => {}
        }
    }

    /// Nobody can type any more. The countdown keeps going; every other
    /// screen is left.
    fn stdin_closed(&mut self) {
        debug!("stdin closed");
        match self.session.route() {
            RouteName::Selector => {
                self.say("Lockdown not started.");
                self.finished = true;
            }
            RouteName::Emergency => self.handle(Input::Cancel, false),
            RouteName::Lockdown => {}
        }
    }

    fn handle(&mut self, input: Input, from_user: bool) {
        let is_tick = input == Input::Tick;
        let effects = self.session.handle(input, self.clock.now());
        let navigated = effects.iter().any(|e| matches!(e, Effect::Navigated(_)));
        for effect in effects {
            self.apply(effect);
        }
        if self.finished {
            return;
        }

        if navigated || (from_user && !matches!(self.session.screen(), Screen::Lockdown(_))) {
            let text = render::screen(self.session.screen());
            self.say(&text);
        } else if is_tick {
            if let Screen::Lockdown(controller) = self.session.screen() {
                let line = render::status_line(controller);
                self.overwrite(&line);
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicker => self.ticker.start(),
            Effect::StopTicker => self.ticker.cancel(),
            Effect::Navigated(route) => debug!(?route, "navigated"),
            Effect::Event(event) => debug!(?event, "session event"),
            Effect::Expired => {
                self.say("Lockdown complete. Welcome back.");
                self.finished = true;
            }
            Effect::Terminate => {
                let outcome = self.chain.run();
                for event in outcome.events(self.clock.now()) {
                    info!(?event, "termination attempt");
                }
                self.finish_termination(outcome);
            }
            Effect::OpenDialer => {
                let outcome = open_dialer(&SystemLauncher, self.config.dialer_number());
                self.report(outcome);
            }
            Effect::OpenMessaging => {
                let outcome = open_messaging(&SystemLauncher, self.config.messaging_number());
                self.report(outcome);
            }
            // Shown by the screen render.
            Effect::Notice(text) => debug!(%text, "notice"),
        }
    }

    fn finish_termination(&mut self, outcome: TerminationOutcome) {
        match outcome {
            TerminationOutcome::Exited { strategy, .. } => {
                info!(%strategy, "session terminated");
                self.finished = true;
            }
            TerminationOutcome::ManualCloseRequired { message, .. } => self.say(&message),
        }
    }

    fn report(&mut self, outcome: CommsOutcome) {
        match outcome {
            CommsOutcome::Opened { uri } => self.say(&format!("Opened {uri}")),
            CommsOutcome::Unavailable { message } => self.say(&message),
        }
    }

    fn say(&mut self, text: &str) {
        self.end_line();
        println!("{text}");
    }

    fn overwrite(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout only loses the status line.
        let _ = write!(stdout, "\r{text}");
        let _ = stdout.flush();
        self.inline = true;
    }

    fn end_line(&mut self) {
        if self.inline {
            println!();
            self.inline = false;
        }
    }
}

fn parse_command<C>(screen: &Screen<C>, line: &str) -> Command {
    let trimmed = line.trim();
    match screen {
        Screen::Selector(selector) if selector.is_confirming() => {
            match trimmed.to_ascii_lowercase().as_str() {
                "y" | "yes" => Command::Input(Input::ConfirmStart),
                "n" | "no" => Command::Input(Input::CancelStart),
                _ => Command::Help("Answer y or n"),
            }
        }
        Screen::Selector(_) => {
            let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
            match word {
                "hours" | "h" => Command::Input(Input::SetHours(rest.trim().to_string())),
                "minutes" | "m" => Command::Input(Input::SetMinutes(rest.trim().to_string())),
                "start" => Command::Input(Input::RequestStart),
                "quit" | "q" => Command::Quit,
                "" => Command::Nothing,
                _ => Command::Help(render::SELECTOR_HELP),
            }
        }
        Screen::Lockdown(_) => match trimmed {
            "emergency" | "e" => Command::Input(Input::Emergency),
            "call" | "c" => Command::Input(Input::Call),
            "message" | "m" => Command::Input(Input::Message),
            "status" | "s" => Command::Status,
            "" => Command::Nothing,
            _ => Command::Help(render::LOCKDOWN_HELP),
        },
        Screen::Emergency(emergency) => match emergency.alert() {
            AlertState::Showing { .. } => Command::Input(Input::Acknowledge),
            AlertState::Hidden if trimmed == ":cancel" => Command::Input(Input::Cancel),
            // Passwords are passed through untrimmed.
            AlertState::Hidden => Command::Input(Input::Password(line.to_string())),
        },
    }
}
