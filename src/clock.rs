//! Current-time provider.
//!
//! Deadline checks take the time from a [`Clock`] so tests can pin it.

use chrono::Utc;

/// Seconds per day, used to turn day counts into deadline offsets.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub trait Clock {
    /// Current UNIX time in seconds.
    fn now(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Timestamp `days` (possibly fractional) after `clock`'s now.
pub fn days_from_now(clock: &dyn Clock, days: f64) -> f64 {
    clock.now() + days * SECONDS_PER_DAY
}
