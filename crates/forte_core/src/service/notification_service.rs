//! Reminder derivation from calendar events.
//!
//! # Responsibility
//! - Turn events dated today or tomorrow into unread notifications.
//! - Own read-state and cascade deletes for the notification partition.
//!
//! # Invariants
//! - At most one notification is ever derived per `event_id`: an event that
//!   already has any stored notification is skipped, read or not.
//! - `derive_and_merge` is idempotent within one local day.
//! - Day distance is measured between local calendar dates, so the
//!   time-of-day of "now" never shifts the result.

use crate::clock::{Clock, SystemClock};
use crate::model::event::CalendarEvent;
use crate::model::new_record_id;
use crate::model::notification::{Notification, NotificationSummary};
use crate::repo::event_repo::EventStore;
use crate::repo::kv_store::KvBackend;
use crate::repo::notification_repo::NotificationStore;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// Derives and manages per-user reminders.
pub struct NotificationEngine<B: KvBackend> {
    events: EventStore<B>,
    notifications: NotificationStore<B>,
    clock: Arc<dyn Clock>,
}

impl<B: KvBackend + Clone> NotificationEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            events: EventStore::with_clock(backend.clone(), Arc::clone(&clock)),
            notifications: NotificationStore::new(backend),
            clock,
        }
    }
}

impl<B: KvBackend> NotificationEngine<B> {
    /// Derives reminders for today/tomorrow events and merges them into storage.
    ///
    /// Returns the full stored set after the merge. Storage is only written
    /// when at least one new reminder was derived.
    pub fn derive_and_merge(&self, username: &str) -> RepoResult<Vec<Notification>> {
        let today = self.clock.today();
        let now = self.clock.now_epoch_ms();
        let mut notifications = self.notifications.load(username);
        let mut derived = 0usize;

        for event in self.events.list(username) {
            if notifications.iter().any(|item| item.event_id == event.id) {
                continue;
            }
            let Some(message) = reminder_message(&event, today) else {
                continue;
            };
            notifications.push(Notification {
                id: new_record_id(now),
                event_id: event.id,
                message,
                read: false,
                created_at: now,
            });
            derived += 1;
        }

        if derived > 0 {
            self.notifications.save(username, &notifications)?;
            info!(
                "event=notifications_derive module=notifications status=ok derived={derived} total={}",
                notifications.len()
            );
        }
        Ok(notifications)
    }

    /// Stored reminders without deriving new ones.
    pub fn list(&self, username: &str) -> Vec<Notification> {
        self.notifications.load(username)
    }

    pub fn unread_count(&self, username: &str) -> usize {
        NotificationSummary::of(&self.list(username)).unread
    }

    /// Marks every stored reminder read.
    pub fn mark_all_read(&self, username: &str) -> RepoResult<Vec<Notification>> {
        let mut notifications = self.notifications.load(username);
        for notification in &mut notifications {
            notification.read = true;
        }
        self.notifications.save(username, &notifications)?;
        Ok(notifications)
    }

    /// Removes every reminder derived from `event_id`.
    pub fn delete_for_event(&self, username: &str, event_id: &str) -> RepoResult<()> {
        let mut notifications = self.notifications.load(username);
        notifications.retain(|item| item.event_id != event_id);
        self.notifications.save(username, &notifications)
    }

    pub fn delete_all_for_user(&self, username: &str) -> RepoResult<()> {
        self.notifications.remove_all_for_user(username)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

/// Reminder text for `event` relative to `today`, if it is due today or tomorrow.
pub fn reminder_message(event: &CalendarEvent, today: NaiveDate) -> Option<String> {
    let Some(date) = event.local_date() else {
        warn!("event=notifications_derive module=notifications status=skipped reason=invalid_event_date");
        return None;
    };
    match date.signed_duration_since(today).num_days() {
        0 => Some(format!("{} is today", event.title)),
        1 => Some(format!("{} is tomorrow", event.title)),
        _ => None,
    }
}
