//! Session: the router plus whichever screen is mounted.
//!
//! Front ends feed [`Input`]s in and carry out the returned [`Effect`]s
//! (start or stop the tick scheduler, open the dialer, run the termination
//! chain, show a message). The session never sleeps and never touches the
//! platform itself, so every transition can be driven from a test.
//!
//! Screens are rebuilt from their route on every mount. The countdown
//! survives a trip to the emergency screen only through the deadline stored
//! in its route, which is why leaving and re-entering neither adds nor
//! removes time.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::emergency::{AlertState, CredentialCheck, EmergencyOverride, FixedPassword, OverrideExit};
use crate::events::Event;
use crate::lockdown::{LockdownConfig, LockdownController, NavParams};
use crate::navigation::{Route, RouteName, Router};
use crate::selector::{DurationSelector, CONFIRMATION_PROMPT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Tick,
    SetHours(String),
    SetMinutes(String),
    RequestStart,
    CancelStart,
    ConfirmStart,
    Emergency,
    Call,
    Message,
    Password(String),
    Acknowledge,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTicker,
    StopTicker,
    Navigated(RouteName),
    Event(Event),
    /// The countdown reached zero; fired once per lockdown.
    Expired,
    Terminate,
    OpenDialer,
    OpenMessaging,
    Notice(String),
}

#[derive(Debug, Clone)]
pub enum Screen<C> {
    Selector(DurationSelector),
    Lockdown(LockdownController),
    Emergency(EmergencyOverride<C>),
}

/// Knobs a front end passes in from its configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub hours_text: String,
    pub minutes_text: String,
    pub confirm_start: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        let selector = DurationSelector::new();
        Self {
            hours_text: selector.hours_text().to_string(),
            minutes_text: selector.minutes_text().to_string(),
            confirm_start: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session<C = FixedPassword> {
    router: Router,
    screen: Screen<C>,
    credential: C,
    options: SessionOptions,
}

impl<C: CredentialCheck + Clone> Session<C> {
    pub fn new(credential: C, options: SessionOptions) -> Self {
        let selector = DurationSelector::with_text(&options.hours_text, &options.minutes_text);
        Self {
            router: Router::default(),
            screen: Screen::Selector(selector),
            credential,
            options,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn screen(&self) -> &Screen<C> {
        &self.screen
    }

    pub fn route(&self) -> RouteName {
        self.router.current().name()
    }

    /// Skip the selector and go straight to a countdown.
    pub fn start_lockdown(&mut self, params: NavParams, now: DateTime<Utc>) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.enter_lockdown(params, now, &mut effects);
        effects
    }

    pub fn handle(&mut self, input: Input, now: DateTime<Utc>) -> Vec<Effect> {
        let mut effects = Vec::new();
        match &mut self.screen {
            Screen::Selector(selector) => match input {
                Input::SetHours(text) => selector.set_hours(text),
                Input::SetMinutes(text) => selector.set_minutes(text),
                Input::RequestStart if self.options.confirm_start => {
                    selector.request_start();
                    effects.push(Effect::Notice(CONFIRMATION_PROMPT.to_string()));
                }
                Input::RequestStart => {
                    let params = selector.submit();
                    self.enter_lockdown(params, now, &mut effects);
                }
                Input::CancelStart => selector.cancel_start(),
                Input::ConfirmStart => {
                    if let Some(params) = selector.confirm() {
                        self.enter_lockdown(params, now, &mut effects);
                    }
                }
                other => ignored(&other, RouteName::Selector),
            },
            Screen::Lockdown(controller) => match input {
                Input::Tick => {
                    if let Some(expired) = controller.tick(now) {
                        effects.push(Effect::StopTicker);
                        effects.push(Effect::Event(expired));
                        effects.push(Effect::Expired);
                        self.navigate_reset(Route::Selector, now, &mut effects);
                    }
                }
                Input::Emergency => {
                    let event = controller.request_emergency_override(now);
                    effects.push(Effect::StopTicker);
                    effects.push(Effect::Event(event));
                    self.navigate_push(Route::Emergency, now, &mut effects);
                }
                Input::Call => effects.push(Effect::OpenDialer),
                Input::Message => effects.push(Effect::OpenMessaging),
                other => ignored(&other, RouteName::Lockdown),
            },
            Screen::Emergency(emergency) => match input {
                Input::Password(text) => {
                    let event = emergency.unlock(&text, now);
                    if let AlertState::Showing { message, .. } = emergency.alert() {
                        effects.push(Effect::Notice(message.clone()));
                    }
                    effects.push(Effect::Event(event));
                }
                Input::Acknowledge => match emergency.acknowledge() {
                    OverrideExit::Terminate => effects.push(Effect::Terminate),
                    OverrideExit::ReturnToLockdown => self.navigate_back(now, &mut effects),
                    OverrideExit::Stay => {}
                },
                Input::Cancel => {
                    emergency.cancel();
                    self.navigate_back(now, &mut effects);
                }
                other => ignored(&other, RouteName::Emergency),
            },
        }
        effects
    }

    // ── Navigation ───────────────────────────────────────────────────

    fn enter_lockdown(&mut self, params: NavParams, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        self.navigate_push(
            Route::Lockdown {
                params,
                deadline: None,
            },
            now,
            effects,
        );
    }

    fn navigate_push(&mut self, route: Route, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        self.unmount(effects);
        self.router.push(route);
        self.mount(now, effects);
    }

    fn navigate_back(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        self.unmount(effects);
        self.router.back();
        self.mount(now, effects);
    }

    fn navigate_reset(&mut self, route: Route, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        self.unmount(effects);
        self.router.reset(route);
        self.mount(now, effects);
    }

    fn unmount(&mut self, effects: &mut Vec<Effect>) {
        // Lockdown handlers stop the ticker first thing; this covers the rest.
        if matches!(self.screen, Screen::Lockdown(_)) && !effects.contains(&Effect::StopTicker) {
            effects.push(Effect::StopTicker);
        }
    }

    fn mount(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        let route = self.router.current().clone();
        self.screen = match route {
            Route::Selector => Screen::Selector(DurationSelector::with_text(
                &self.options.hours_text,
                &self.options.minutes_text,
            )),
            Route::Lockdown { params, deadline } => {
                let config = LockdownConfig::from_params(&params);
                let controller = match deadline {
                    Some(deadline) => LockdownController::resume_until(config, deadline, now),
                    None => {
                        let (controller, started) = LockdownController::start(config, now);
                        if let Route::Lockdown { deadline, .. } = self.router.current_mut() {
                            *deadline = Some(controller.deadline_from(now));
                        }
                        effects.push(Effect::Event(started));
                        controller
                    }
                };
                effects.push(Effect::StartTicker);
                Screen::Lockdown(controller)
            }
            Route::Emergency => Screen::Emergency(EmergencyOverride::new(self.credential.clone())),
        };
        effects.push(Effect::Navigated(self.router.current().name()));
    }
}

impl Default for Session<FixedPassword> {
    fn default() -> Self {
        Self::new(FixedPassword::default(), SessionOptions::default())
    }
}

fn ignored(input: &Input, screen: RouteName) {
    debug!(?input, ?screen, "input ignored on this screen");
}
