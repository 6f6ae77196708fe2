//! Drives a [`Timer`] from a tokio interval.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mastery_core::timer::{Timer, TimerState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::TimerDriverError;

fn lock(timer: &Mutex<Timer>) -> MutexGuard<'_, Timer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ticks a shared timer once per period while it runs.
///
/// Elapsed seconds are published on a `watch` channel. The ticking task only
/// exists while the timer is running; pause, reset, stop, and drop abort it.
pub struct TimerDriver {
    timer: Arc<Mutex<Timer>>,
    elapsed: Arc<watch::Sender<u64>>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDriver {
    /// A driver ticking once per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            timer: Arc::new(Mutex::new(Timer::new())),
            elapsed: Arc::new(tx),
            period,
            task: None,
        }
    }

    /// Receiver that sees every published elapsed-seconds value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        lock(&self.timer).elapsed_secs()
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        lock(&self.timer).state()
    }

    /// # Errors
    ///
    /// Returns `TimerDriverError::Timer` unless the timer is stopped, or
    /// `TimerDriverError::NoRuntime` outside a tokio runtime.
    pub fn start(&mut self) -> Result<(), TimerDriverError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerDriverError::NoRuntime)?;
        lock(&self.timer).start()?;
        self.spawn_ticker(&runtime);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TimerDriverError::Timer` unless the timer is running.
    pub fn pause(&mut self) -> Result<(), TimerDriverError> {
        lock(&self.timer).pause()?;
        self.abort_ticker();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TimerDriverError::Timer` unless the timer is paused, or
    /// `TimerDriverError::NoRuntime` outside a tokio runtime.
    pub fn resume(&mut self) -> Result<(), TimerDriverError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerDriverError::NoRuntime)?;
        lock(&self.timer).resume()?;
        self.spawn_ticker(&runtime);
        Ok(())
    }

    /// Back to stopped with zero elapsed; listeners see 0.
    pub fn reset(&mut self) {
        self.abort_ticker();
        lock(&self.timer).reset();
        self.elapsed.send_replace(0);
    }

    /// Stop ticking and return the elapsed seconds. A running timer is left
    /// paused so the value can still be read.
    pub fn stop(&mut self) -> u64 {
        self.abort_ticker();
        let mut timer = lock(&self.timer);
        let paused = timer.is_running() && timer.pause().is_ok();
        tracing::debug!(elapsed_secs = timer.elapsed_secs(), paused, "timer stopped");
        timer.elapsed_secs()
    }

    fn spawn_ticker(&mut self, runtime: &tokio::runtime::Handle) {
        self.abort_ticker();
        let timer = Arc::clone(&self.timer);
        let elapsed = Arc::clone(&self.elapsed);
        let period = self.period;
        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let secs = {
                    let mut timer = lock(&timer);
                    if !timer.tick() {
                        break;
                    }
                    timer.elapsed_secs()
                };
                elapsed.send_replace(secs);
            }
        }));
    }

    fn abort_ticker(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}
