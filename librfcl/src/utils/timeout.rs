//! Timeout helpers used across the crate.
//!
//! Frame waiting times of the T=CL layer are microseconds while the byte
//! transports think in milliseconds; the conversions live here.

use std::time::{Duration, Instant};

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Round a microsecond wait up to whole milliseconds, never below one.
pub fn us_to_ms_ceil(us: u64) -> u64 {
    us.div_ceil(1000).max(1)
}

/// Absolute deadline for the polling variants.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Time left in milliseconds, clamped to `cap`.
    pub fn remaining_ms(&self, cap: u64) -> u64 {
        (self.remaining().as_millis() as u64).min(cap)
    }
}
