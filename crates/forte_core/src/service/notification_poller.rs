//! Interval-gated reminder refresh for an open session.
//!
//! The caller drives ticks (for example from its UI loop); nothing here
//! spawns threads or timers.

use crate::model::notification::NotificationSummary;
use crate::repo::kv_store::KvBackend;
use crate::repo::RepoResult;
use crate::service::notification_service::NotificationEngine;
use std::time::Duration;

/// Refresh cadence used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Tracks when reminders were last refreshed.
#[derive(Debug, Clone)]
pub struct NotificationPoller {
    interval_ms: i64,
    last_poll_ms: Option<i64>,
}

impl Default for NotificationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl NotificationPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_poll_ms: None,
        }
    }

    /// True on the first tick, after the interval elapsed, or if the clock
    /// moved backwards.
    pub fn is_due(&self, now_ms: i64) -> bool {
        match self.last_poll_ms {
            None => true,
            Some(last) => now_ms < last || now_ms - last >= self.interval_ms,
        }
    }

    /// Re-derives reminders when due and reports the bell counts.
    pub fn poll<B: KvBackend>(
        &mut self,
        engine: &NotificationEngine<B>,
        username: &str,
    ) -> RepoResult<Option<NotificationSummary>> {
        if !self.is_due(engine.clock().now_epoch_ms()) {
            return Ok(None);
        }
        self.force_poll(engine, username).map(Some)
    }

    /// Re-derives reminders regardless of the interval.
    pub fn force_poll<B: KvBackend>(
        &mut self,
        engine: &NotificationEngine<B>,
        username: &str,
    ) -> RepoResult<NotificationSummary> {
        let notifications = engine.derive_and_merge(username)?;
        self.last_poll_ms = Some(engine.clock().now_epoch_ms());
        Ok(NotificationSummary::of(&notifications))
    }

    /// Forgets the last refresh, e.g. after logout.
    pub fn reset(&mut self) {
        self.last_poll_ms = None;
    }
}
