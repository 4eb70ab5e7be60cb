//! End-to-end flows through the session: selector, countdown, emergency
//! override and termination.

use chrono::Duration;
use techdetox_core::emergency::{ProcessExit, ShutdownSignal, MANUAL_CLOSE_MESSAGE};
use techdetox_core::{
    Clock, Effect, Event, FixedPassword, Input, ManualClock, NavParams, RouteName, Screen,
    Session, SessionOptions, TerminationChain, TerminationOutcome,
};

fn remaining(session: &Session) -> u64 {
    match session.screen() {
        Screen::Lockdown(ctl) => ctl.seconds_remaining(),
        _ => panic!("Expected the lockdown screen"),
    }
}

fn started(minutes: &str, clock: &ManualClock) -> Session {
    let mut session = Session::default();
    session.handle(Input::SetHours("0".into()), clock.now());
    session.handle(Input::SetMinutes(minutes.into()), clock.now());
    session.handle(Input::RequestStart, clock.now());
    session.handle(Input::ConfirmStart, clock.now());
    assert_eq!(session.route(), RouteName::Lockdown);
    session
}

#[test]
fn full_countdown_returns_to_selector() {
    let clock = ManualClock::default();
    let mut session = started("1", &clock);

    let mut transitions = 0;
    for _ in 0..75 {
        clock.advance_secs(1);
        let effects = session.handle(Input::Tick, clock.now());
        transitions += effects
            .iter()
            .filter(|e| matches!(e, Effect::Event(Event::LockdownExpired { .. })))
            .count();
    }
    assert_eq!(transitions, 1);
    assert_eq!(session.route(), RouteName::Selector);
}

#[test]
fn wrong_password_leaves_countdown_untouched() {
    let clock = ManualClock::default();
    let mut session = started("10", &clock);
    clock.advance_secs(30);
    session.handle(Input::Tick, clock.now());
    let before = remaining(&session);

    session.handle(Input::Emergency, clock.now());
    assert_eq!(session.route(), RouteName::Emergency);
    let effects = session.handle(Input::Password("0000".into()), clock.now());
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Event(Event::UnlockDenied { .. }))));
    session.handle(Input::Acknowledge, clock.now());

    assert_eq!(session.route(), RouteName::Lockdown);
    assert_eq!(remaining(&session), before);
}

#[test]
fn suspended_process_catches_up_on_next_tick() {
    let clock = ManualClock::default();
    let mut session = started("10", &clock);
    // No ticks for five minutes, e.g. the machine slept.
    clock.advance_secs(300);
    session.handle(Input::Tick, clock.now());
    assert_eq!(remaining(&session), 300);
}

#[test]
fn granted_password_runs_termination_chain() {
    let clock = ManualClock::default();
    let mut session = started("10", &clock);
    session.handle(Input::Emergency, clock.now());
    session.handle(Input::Password("1234".into()), clock.now());
    let effects = session.handle(Input::Acknowledge, clock.now());
    assert_eq!(effects, vec![Effect::Terminate]);

    let (signal, shutdown) = ShutdownSignal::new();
    let chain = TerminationChain::new().with(signal).with(ProcessExit {
        code: 0,
        enabled: false,
    });
    let outcome = chain.run();
    assert!(matches!(outcome, TerminationOutcome::Exited { ref strategy, .. } if strategy == "shutdown_signal"));
    assert!(*shutdown.borrow());
}

#[test]
fn termination_falls_back_to_manual_close() {
    let (signal, shutdown) = ShutdownSignal::new();
    drop(shutdown);
    let chain = TerminationChain::new().with(signal).with(ProcessExit {
        code: 0,
        enabled: false,
    });
    match chain.run() {
        TerminationOutcome::ManualCloseRequired { message, attempts } => {
            assert_eq!(message, MANUAL_CLOSE_MESSAGE);
            let order: Vec<_> = attempts.iter().map(|a| a.strategy.as_str()).collect();
            assert_eq!(order, ["shutdown_signal", "process_exit"]);
        }
        other => panic!("Expected manual close, got {other:?}"),
    }
}

#[test]
fn malformed_params_render_default_lockdown() {
    let clock = ManualClock::default();
    let mut session = Session::new(FixedPassword::default(), SessionOptions::default());
    let effects = session.start_lockdown(
        NavParams {
            initial_hours: Some("abc".into()),
            initial_minutes: None,
            total_minutes: None,
        },
        clock.now(),
    );
    assert!(effects.contains(&Effect::StartTicker));
    match session.screen() {
        Screen::Lockdown(ctl) => {
            assert_eq!(ctl.config().initial_hours, 5);
            assert_eq!(ctl.config().initial_minutes, 0);
            assert_eq!(ctl.config().total_minutes(), 300);
            assert_eq!(ctl.display().to_string(), "05:00:00");
        }
        _ => panic!("Expected the lockdown screen"),
    }
}

#[test]
fn remaining_time_is_consistent_across_repeated_overrides() {
    let clock = ManualClock::default();
    let mut session = started("3", &clock);
    for _ in 0..3 {
        clock.advance_secs(10);
        session.handle(Input::Emergency, clock.now());
        clock.advance(Duration::seconds(5));
        session.handle(Input::Cancel, clock.now());
    }
    assert_eq!(remaining(&session), 180 - 45);
}
