//! Progress scheduler
//!
//! A cancellable repeating timer on a tokio runtime. It knows nothing about
//! playback: the controller hands it a tick callback and decides what a tick
//! means. Running on tokio time lets tests drive it with a paused clock.

use crate::error::PlaybackError;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, trace, warn};

/// Repeating timer with at most one active task
pub struct ProgressScheduler {
    interval: Duration,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
}

impl ProgressScheduler {
    /// Create a stopped scheduler firing every `interval` on `runtime`
    pub fn new(interval: Duration, runtime: Handle) -> Self {
        Self {
            interval,
            runtime,
            task: None,
        }
    }

    /// Whether a timer task is active
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start firing `tick` now and then every interval
    ///
    /// Replaces any running timer. A tick that returns an error or panics is
    /// logged and skipped; later ticks still fire.
    pub fn start<F>(&mut self, mut tick: F)
    where
        F: FnMut() -> Result<(), PlaybackError> + Send + 'static,
    {
        self.stop();

        let period = self.interval;
        let task = self.runtime.spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                trace!("Progress tick");

                match panic::catch_unwind(AssertUnwindSafe(&mut tick)) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Progress tick failed, skipping"),
                    Err(_) => error!("Progress tick panicked, skipping"),
                }
            }
        });

        self.task = Some(task);
    }

    /// Cancel future ticks; no-op when not running
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
