//! Process termination after a granted override.
//!
//! Strategies are tried in order, each at most once. The first success ends
//! the chain; if every strategy fails the caller gets manual-close
//! instructions instead of an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::CapabilityError;
use crate::events::Event;

pub const MANUAL_CLOSE_MESSAGE: &str = "Please manually close the app from your recent apps.";

pub trait ExitStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self) -> Result<(), CapabilityError>;
}

/// Ask the running event loop to shut down cleanly.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// The receiver resolves to `true` once shutdown is requested.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, rx)
    }
}

impl ExitStrategy for ShutdownSignal {
    fn name(&self) -> &'static str {
        "shutdown_signal"
    }

    fn attempt(&self) -> Result<(), CapabilityError> {
        // Fails when nobody is listening any more.
        self.tx
            .send(true)
            .map_err(|_| CapabilityError::unavailable("shutdown signal"))
    }
}

/// Hard exit of the current process. Only returns if `enabled` is false.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    pub code: i32,
    pub enabled: bool,
}

impl Default for ProcessExit {
    fn default() -> Self {
        Self {
            code: 0,
            enabled: true,
        }
    }
}

impl ExitStrategy for ProcessExit {
    fn name(&self) -> &'static str {
        "process_exit"
    }

    fn attempt(&self) -> Result<(), CapabilityError> {
        if !self.enabled {
            return Err(CapabilityError::unavailable("process exit"));
        }
        info!(code = self.code, "exiting process");
        std::process::exit(self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationAttempt {
    pub strategy: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminationOutcome {
    Exited {
        strategy: String,
        attempts: Vec<TerminationAttempt>,
    },
    ManualCloseRequired {
        message: String,
        attempts: Vec<TerminationAttempt>,
    },
}

impl TerminationAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn to_event(&self, at: DateTime<Utc>) -> Event {
        Event::TerminationAttempted {
            strategy: self.strategy.clone(),
            succeeded: self.succeeded(),
            at,
        }
    }
}

impl TerminationOutcome {
    pub fn attempts(&self) -> &[TerminationAttempt] {
        match self {
            Self::Exited { attempts, .. } | Self::ManualCloseRequired { attempts, .. } => attempts,
        }
    }

    /// One `TerminationAttempted` event per strategy tried, in order.
    pub fn events(&self, at: DateTime<Utc>) -> Vec<Event> {
        self.attempts().iter().map(|a| a.to_event(at)).collect()
    }
}

#[derive(Default)]
pub struct TerminationChain {
    strategies: Vec<Box<dyn ExitStrategy>>,
}

impl TerminationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl ExitStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn run(&self) -> TerminationOutcome {
        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            match strategy.attempt() {
                Ok(()) => {
                    info!(strategy = strategy.name(), "termination succeeded");
                    attempts.push(TerminationAttempt {
                        strategy: strategy.name().to_string(),
                        error: None,
                    });
                    return TerminationOutcome::Exited {
                        strategy: strategy.name().to_string(),
                        attempts,
                    };
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "termination strategy failed");
                    attempts.push(TerminationAttempt {
                        strategy: strategy.name().to_string(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        warn!("no termination strategy succeeded; asking for manual close");
        TerminationOutcome::ManualCloseRequired {
            message: MANUAL_CLOSE_MESSAGE.to_string(),
            attempts,
        }
    }
}

impl std::fmt::Debug for TerminationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl ExitStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn attempt(&self) -> Result<(), CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(CapabilityError::unavailable(self.name))
            }
        }
    }

    fn scripted(name: &'static str, succeed: bool) -> (Scripted, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Scripted {
                name,
                succeed,
                calls: calls.clone(),
            },
            calls,
        )
    }

    #[test]
    fn first_success_stops_the_chain() {
        let (a, a_calls) = scripted("a", true);
        let (b, b_calls) = scripted("b", true);
        let outcome = TerminationChain::new().with(a).with(b).run();
        assert!(matches!(outcome, TerminationOutcome::Exited { ref strategy, .. } if strategy == "a"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn falls_back_in_order() {
        let (a, a_calls) = scripted("a", false);
        let (b, b_calls) = scripted("b", true);
        let outcome = TerminationChain::new().with(a).with(b).run();
        assert_eq!(outcome.attempts().len(), 2);
        assert_eq!(outcome.attempts()[0].strategy, "a");
        assert!(outcome.attempts()[0].error.is_some());
        assert!(matches!(outcome, TerminationOutcome::Exited { ref strategy, .. } if strategy == "b"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn attempts_become_events_in_order() {
        let (a, _) = scripted("a", false);
        let (b, _) = scripted("b", true);
        let at = Utc::now();
        let events = TerminationChain::new().with(a).with(b).run().events(at);
        assert_eq!(
            events,
            vec![
                Event::TerminationAttempted {
                    strategy: "a".into(),
                    succeeded: false,
                    at,
                },
                Event::TerminationAttempted {
                    strategy: "b".into(),
                    succeeded: true,
                    at,
                },
            ]
        );
    }

    #[test]
    fn exhausted_chain_asks_for_manual_close() {
        let (a, a_calls) = scripted("a", false);
        let (b, b_calls) = scripted("b", false);
        let outcome = TerminationChain::new().with(a).with(b).run();
        match outcome {
            TerminationOutcome::ManualCloseRequired { message, attempts } => {
                assert_eq!(message, MANUAL_CLOSE_MESSAGE);
                assert_eq!(attempts.len(), 2);
            }
            other => panic!("Expected manual close, got {other:?}"),
        }
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_chain_asks_for_manual_close() {
        let outcome = TerminationChain::new().run();
        assert!(matches!(outcome, TerminationOutcome::ManualCloseRequired { .. }));
    }

    #[test]
    fn shutdown_signal_notifies_listener() {
        let (signal, rx) = ShutdownSignal::new();
        assert!(signal.attempt().is_ok());
        assert!(*rx.borrow());
    }

    #[test]
    fn shutdown_signal_without_listener_fails() {
        let (signal, rx) = ShutdownSignal::new();
        drop(rx);
        assert!(signal.attempt().is_err());
    }

    #[test]
    fn disabled_process_exit_falls_through() {
        let exit = ProcessExit {
            code: 0,
            enabled: false,
        };
        let outcome = TerminationChain::new().with(exit).run();
        assert!(matches!(outcome, TerminationOutcome::ManualCloseRequired { .. }));
    }
}
