//! Time source for record timestamps and reminder derivation.
//!
//! Injected into stores so date-dependent behavior can be pinned in tests.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::{Mutex, PoisonError};

/// Supplies "now" in epoch milliseconds and the local calendar date.
pub trait Clock: Send + Sync {
    /// Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
    /// Local calendar date of "now".
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock. The stored instant is treated as local time.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to `hour:00` on `date`.
    pub fn at(date: NaiveDate, hour: u32) -> Self {
        Self::new(
            date.and_hms_opt(hour, 0, 0)
                .unwrap_or_else(|| date.and_time(NaiveTime::MIN)),
        )
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    fn current(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> i64 {
        self.current().and_utc().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        self.current().date()
    }
}
