//! Time source abstraction.
//!
//! Repositories stamp `created_at`/`updated_at` through a [`Clock`] so tests
//! can pin and advance time deterministically.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replay tooling.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Starts at the given unix epoch milliseconds.
    ///
    /// Out-of-range values fall back to the unix epoch.
    pub fn at_epoch_ms(epoch_ms: i64) -> Self {
        let start = Utc
            .timestamp_millis_opt(epoch_ms)
            .single()
            .unwrap_or_default();
        Self::new(start)
    }

    pub fn advance(&self, step: Duration) {
        if let Ok(mut current) = self.current.lock() {
            *current += step;
        }
    }

    pub fn set(&self, value: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = value;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
            .lock()
            .map(|current| *current)
            .unwrap_or_default()
    }
}
