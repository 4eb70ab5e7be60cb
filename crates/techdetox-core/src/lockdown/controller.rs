//! Lockdown countdown state machine.
//!
//! The controller keeps an absolute deadline and recomputes the remaining
//! seconds from it on every tick, so a suspended process or a late tick never
//! makes the countdown drift. It has no internal thread; the caller feeds it
//! `now` on each tick (see [`super::TickScheduler`]).
//!
//! ## State Transitions
//!
//! ```text
//! Running -> Expired
//!    |  ^
//!    v  |
//! Suspended
//! ```
//!
//! `Expired` is terminal: the `LockdownExpired` event is returned by exactly
//! one `tick()` call and nothing resumes the countdown afterwards.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::LockdownConfig;
use super::display::{format_time, progress_percent, TimeDisplay};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockdownState {
    Running,
    /// Ticking is stopped but time is left.
    Suspended,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub seconds_remaining: u64,
    pub is_running: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockdownController {
    config: LockdownConfig,
    countdown: CountdownState,
    /// Absent while suspended.
    deadline: Option<DateTime<Utc>>,
    expiry_fired: bool,
}

impl LockdownController {
    /// Begin a fresh lockdown at `now`.
    pub fn start(config: LockdownConfig, now: DateTime<Utc>) -> (Self, Event) {
        let deadline = deadline_after(now, config.total_seconds);
        let controller = Self::resume_until(config, deadline, now);
        info!(
            total_secs = config.total_seconds,
            %deadline,
            "lockdown started"
        );
        let event = Event::LockdownStarted {
            total_secs: config.total_seconds,
            deadline,
            at: now,
        };
        (controller, event)
    }

    /// Remount against a deadline chosen earlier, e.g. when coming back from
    /// the emergency screen. A deadline already in the past expires on the
    /// next tick.
    pub fn resume_until(config: LockdownConfig, deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let seconds_remaining = seconds_until(deadline, now).min(config.total_seconds);
        Self {
            config,
            countdown: CountdownState {
                seconds_remaining,
                is_running: true,
            },
            deadline: Some(deadline),
            expiry_fired: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &LockdownConfig {
        &self.config
    }

    pub fn countdown(&self) -> CountdownState {
        self.countdown
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.countdown.seconds_remaining
    }

    pub fn state(&self) -> LockdownState {
        if self.countdown.seconds_remaining == 0 {
            LockdownState::Expired
        } else if self.countdown.is_running {
            LockdownState::Running
        } else {
            LockdownState::Suspended
        }
    }

    pub fn has_fired_expiry(&self) -> bool {
        self.expiry_fired
    }

    /// Deadline to carry across a remount. A suspended countdown gets one
    /// computed from `now` and the frozen remaining time.
    pub fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.deadline
            .unwrap_or_else(|| deadline_after(now, self.countdown.seconds_remaining))
    }

    pub fn display(&self) -> TimeDisplay {
        format_time(self.countdown.seconds_remaining)
    }

    pub fn progress_percent(&self) -> f64 {
        progress_percent(&self.config, self.countdown.seconds_remaining)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            seconds_remaining: self.countdown.seconds_remaining,
            total_secs: self.config.total_seconds,
            display: self.display().to_string(),
            progress_pct: self.progress_percent(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call once per scheduler tick. Returns `Some(Event::LockdownExpired)`
    /// on the tick that reaches zero and `None` on every other call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.countdown.is_running {
            return None;
        }
        self.refresh(now);
        debug!(seconds_remaining = self.countdown.seconds_remaining, "lockdown tick");

        if self.countdown.seconds_remaining > 0 {
            return None;
        }
        self.countdown.is_running = false;
        if self.expiry_fired {
            return None;
        }
        self.expiry_fired = true;
        info!(total_secs = self.config.total_seconds, "lockdown expired");
        Some(Event::LockdownExpired {
            total_secs: self.config.total_seconds,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.countdown.is_running {
            return None;
        }
        self.refresh(now);
        if self.countdown.seconds_remaining == 0 {
            // Let the next tick deliver the expiry.
            return None;
        }
        self.countdown.is_running = false;
        self.deadline = None;
        Some(Event::LockdownPaused {
            seconds_remaining: self.countdown.seconds_remaining,
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state() != LockdownState::Suspended {
            return None;
        }
        let deadline = deadline_after(now, self.countdown.seconds_remaining);
        self.deadline = Some(deadline);
        self.countdown.is_running = true;
        Some(Event::LockdownResumed {
            seconds_remaining: self.countdown.seconds_remaining,
            deadline,
            at: now,
        })
    }

    /// Hand control to the emergency screen. Remaining time is left as is.
    pub fn request_emergency_override(&self, now: DateTime<Utc>) -> Event {
        info!(
            seconds_remaining = self.countdown.seconds_remaining,
            "emergency override requested"
        );
        Event::OverrideRequested {
            seconds_remaining: self.countdown.seconds_remaining,
            at: now,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh(&mut self, now: DateTime<Utc>) {
        if let Some(deadline) = self.deadline {
            // Never count back up, even if the wall clock steps backwards.
            self.countdown.seconds_remaining = self
                .countdown
                .seconds_remaining
                .min(seconds_until(deadline, now));
        }
    }
}

/// `now + secs`, saturating at the latest representable instant.
pub(crate) fn deadline_after(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole seconds left until `deadline`, rounded up.
fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = (deadline - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms as u64).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn starts_running_with_full_duration() {
        let (ctl, event) = LockdownController::start(LockdownConfig::new(1, 30), t0());
        assert_eq!(ctl.state(), LockdownState::Running);
        assert_eq!(ctl.seconds_remaining(), 90 * 60);
        assert!(matches!(event, Event::LockdownStarted { total_secs: 5400, .. }));
    }

    #[test]
    fn tick_tracks_wall_clock_not_tick_count() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 10), t0());
        // One tick after a long suspension catches up in one step.
        assert!(ctl.tick(t0() + Duration::seconds(400)).is_none());
        assert_eq!(ctl.seconds_remaining(), 200);
    }

    #[test]
    fn partial_seconds_round_up() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 1), t0());
        ctl.tick(t0() + Duration::milliseconds(59_500));
        assert_eq!(ctl.seconds_remaining(), 1);
        assert_eq!(ctl.display().to_string(), "00:00:01");
    }

    #[test]
    fn expiry_fires_once() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 1), t0());
        let fired = ctl.tick(t0() + Duration::seconds(60));
        assert!(matches!(fired, Some(Event::LockdownExpired { .. })));
        assert_eq!(ctl.state(), LockdownState::Expired);
        for extra in 61..70 {
            assert!(ctl.tick(t0() + Duration::seconds(extra)).is_none());
        }
        assert!(ctl.has_fired_expiry());
    }

    #[test]
    fn zero_length_lockdown_expires_on_first_tick() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 0), t0());
        assert_eq!(ctl.state(), LockdownState::Expired);
        assert!(ctl.tick(t0()).is_some());
        assert!(ctl.tick(t0()).is_none());
    }

    #[test]
    fn backwards_clock_never_adds_time() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 5), t0());
        ctl.tick(t0() + Duration::seconds(100));
        assert_eq!(ctl.seconds_remaining(), 200);
        ctl.tick(t0() + Duration::seconds(10));
        assert_eq!(ctl.seconds_remaining(), 200);
    }

    #[test]
    fn pause_freezes_and_resume_shifts_deadline() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 5), t0());
        assert!(ctl.pause(t0() + Duration::seconds(60)).is_some());
        assert_eq!(ctl.state(), LockdownState::Suspended);

        // Ticks while suspended change nothing.
        assert!(ctl.tick(t0() + Duration::seconds(200)).is_none());
        assert_eq!(ctl.seconds_remaining(), 240);

        let resumed_at = t0() + Duration::seconds(1000);
        assert!(ctl.resume(resumed_at).is_some());
        ctl.tick(resumed_at + Duration::seconds(40));
        assert_eq!(ctl.seconds_remaining(), 200);
    }

    #[test]
    fn resume_is_rejected_after_expiry() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 1), t0());
        ctl.tick(t0() + Duration::seconds(61));
        assert!(ctl.resume(t0() + Duration::seconds(62)).is_none());
        assert!(ctl.pause(t0() + Duration::seconds(62)).is_none());
        assert_eq!(ctl.state(), LockdownState::Expired);
    }

    #[test]
    fn override_request_does_not_touch_remaining_time() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 5), t0());
        ctl.tick(t0() + Duration::seconds(30));
        let before = ctl.countdown();
        let event = ctl.request_emergency_override(t0() + Duration::seconds(45));
        assert_eq!(ctl.countdown(), before);
        assert!(matches!(
            event,
            Event::OverrideRequested { seconds_remaining: 270, .. }
        ));
    }

    #[test]
    fn remount_keeps_original_deadline() {
        let (ctl, _) = LockdownController::start(LockdownConfig::new(0, 5), t0());
        let deadline = ctl.deadline_from(t0());
        let later = t0() + Duration::seconds(100);
        let remounted = LockdownController::resume_until(*ctl.config(), deadline, later);
        assert_eq!(remounted.seconds_remaining(), 200);
        assert_eq!(remounted.state(), LockdownState::Running);
    }

    #[test]
    fn snapshot_reports_display_and_progress() {
        let (mut ctl, _) = LockdownController::start(LockdownConfig::new(0, 2), t0());
        ctl.tick(t0() + Duration::seconds(60));
        match ctl.snapshot(t0()) {
            Event::StateSnapshot {
                state,
                display,
                progress_pct,
                ..
            } => {
                assert_eq!(state, LockdownState::Running);
                assert_eq!(display, "00:01:00");
                assert_eq!(progress_pct, 50.0);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn far_future_deadline_saturates() {
        let (ctl, _) = LockdownController::start(LockdownConfig::new(u64::MAX, 0), t0());
        assert_eq!(ctl.state(), LockdownState::Running);
        assert!(ctl.seconds_remaining() > 0);
    }
}
