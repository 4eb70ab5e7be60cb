//! Fixed-period tick source for the countdown screen.
//!
//! A tokio interval task pushes ticks into a one-slot channel. Ticks that
//! arrive while the slot is full are dropped rather than queued, since the
//! controller recomputes from its deadline anyway. Cancelling (or dropping)
//! the scheduler aborts the task and discards the receiver, so no tick can be
//! observed after the lockdown screen is gone.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    ticks: Option<mpsc::Receiver<()>>,
}

impl TickScheduler {
    /// An idle scheduler. Nothing ticks until [`start`](Self::start).
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            handle: None,
            ticks: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the interval task. Restarting cancels the previous task first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.cancel();
        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        });
        debug!(period_ms = period.as_millis() as u64, "tick scheduler started");
        self.handle = Some(handle);
        self.ticks = Some(rx);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("tick scheduler cancelled");
        }
        self.ticks = None;
    }

    /// Wait for the next tick. Pends forever while the scheduler is idle, so
    /// it can sit in a `select!` unconditionally.
    pub async fn next(&mut self) {
        match self.ticks.as_mut() {
            Some(rx) => {
                if rx.recv().await.is_none() {
                    self.ticks = None;
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
