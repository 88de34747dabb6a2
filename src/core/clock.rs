//! Tick driver for the pacing timers
//!
//! Engines only move through their own tick() methods, so tests drive
//! them directly with no runtime. This owns the one background task that
//! calls tick() on the wall clock when the app is live.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::TICK_INTERVAL_SECS;

/// Owns at most one background ticking task
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Create new ticker, not yet running
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Wall-clock gap between ticks
    pub fn period() -> Duration {
        Duration::from_secs(TICK_INTERVAL_SECS)
    }

    /// Spawn the driving task; a second start while running is a no-op
    pub fn start<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_running() {
            return;
        }
        self.handle = Some(tokio::spawn(task));
        debug!("ticker started");
    }

    /// Stop the driving task; safe to call any number of times
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("ticker stopped");
        }
    }

    /// A task was started and has not finished or been stopped
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        // Best-effort stop if the owner exits early; never block in Drop
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
