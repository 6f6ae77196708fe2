use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("cannot {action:?} a timer that is {from:?}")]
    InvalidTransition { from: TimerState, action: TimerAction },
}

/// Elapsed-seconds counter for one practice session.
///
/// The timer does not read a clock. Something external calls `tick` once per
/// period; ticks only count while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    state: TimerState,
    elapsed_secs: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            elapsed_secs: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    fn transition(
        &mut self,
        action: TimerAction,
        from: TimerState,
        to: TimerState,
    ) -> Result<(), TimerError> {
        if self.state != from {
            return Err(TimerError::InvalidTransition {
                from: self.state,
                action,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Stopped → Running.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless the timer is stopped.
    pub fn start(&mut self) -> Result<(), TimerError> {
        self.transition(TimerAction::Start, TimerState::Stopped, TimerState::Running)
    }

    /// Running → Paused.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless the timer is running.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        self.transition(TimerAction::Pause, TimerState::Running, TimerState::Paused)
    }

    /// Paused → Running.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless the timer is paused.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        self.transition(TimerAction::Resume, TimerState::Paused, TimerState::Running)
    }

    /// Any state → Stopped, elapsed back to zero.
    pub fn reset(&mut self) {
        self.state = TimerState::Stopped;
        self.elapsed_secs = 0;
    }

    /// Advance by one second if running. Returns true if time advanced.
    pub fn tick(&mut self) -> bool {
        if self.is_running() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            true
        } else {
            false
        }
    }
}

/// Formats seconds as `MM:SS`, or `HH:MM:SS` once an hour has passed.
#[must_use]
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Compact duration label: `1h 5m`, `3m 20s`, or `45s`.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
