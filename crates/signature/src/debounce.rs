//! Trailing-edge debouncing for bursty events
//!
//! Timestamps are durations since an arbitrary session epoch (for example
//! `performance.now()` in the browser, or `Instant::elapsed` natively), so the
//! debouncer itself never reads a clock.

use std::time::Duration;

/// Collapses a burst of triggers into one firing after a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    /// When the pending firing becomes due (None if idle)
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn from_millis(millis: u32) -> Self {
        Self::new(Duration::from_millis(millis as u64))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record an event; pushes the deadline out to `now + quiet_period`
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.quiet_period);
    }

    /// Returns true exactly once per burst, when the quiet period has elapsed
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Check if a firing is scheduled
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending firing, if any
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(now))
    }

    /// Drop a pending firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
