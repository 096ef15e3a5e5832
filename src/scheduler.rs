use std::time::{Duration, Instant};

/// Periodic tick source for the engine.
///
/// Fires at most once per poll. If the caller falls behind, the missed
/// intervals are dropped rather than replayed, so one logical interval can
/// never move the snake twice.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    interval: Duration,
    last_tick: Instant,
    suspended: bool,
}

impl TickScheduler {
    #[must_use]
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_tick: now,
            suspended: false,
        }
    }

    /// Returns true when a tick is due at `now`, and re-arms from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.suspended || now.saturating_duration_since(self.last_tick) < self.interval {
            return false;
        }
        self.last_tick = now;
        true
    }

    /// Applies a new interval, effective from the next poll.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Stops delivering ticks until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Restarts delivery; the first tick comes one full interval after `now`.
    pub fn resume(&mut self, now: Instant) {
        if self.suspended {
            self.suspended = false;
            self.last_tick = now;
        }
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Time left until the next tick is due, zero if overdue.
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_tick))
    }
}
