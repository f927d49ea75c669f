//! Time source for id allocation and modification stamps.

use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Unix epoch milliseconds.
    fn now_millis(&self) -> i64;

    fn now_secs(&self) -> i64 {
        self.now_millis() / 1000
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
