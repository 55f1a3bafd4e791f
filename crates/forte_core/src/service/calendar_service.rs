//! Calendar use-cases with notification cascades.

use crate::model::event::{CalendarEvent, EventPatch, NewEvent};
use crate::repo::event_repo::EventStore;
use crate::repo::kv_store::KvBackend;
use crate::repo::RepoResult;
use crate::service::notification_service::NotificationEngine;
use chrono::NaiveDate;

/// Event CRUD facade that keeps reminders consistent with their events.
///
/// Borrows the caller's stores, so event subscribers see every write made
/// through this service.
pub struct CalendarService<'s, B: KvBackend> {
    events: &'s EventStore<B>,
    notifications: &'s NotificationEngine<B>,
}

impl<'s, B: KvBackend> CalendarService<'s, B> {
    pub fn new(events: &'s EventStore<B>, notifications: &'s NotificationEngine<B>) -> Self {
        Self {
            events,
            notifications,
        }
    }

    pub fn add_event(&self, username: &str, input: NewEvent) -> RepoResult<Vec<CalendarEvent>> {
        self.events.add(username, input)
    }

    pub fn update_event(
        &self,
        username: &str,
        id: &str,
        patch: &EventPatch,
    ) -> RepoResult<Vec<CalendarEvent>> {
        self.events.update(username, id, patch)
    }

    /// Removes the event and every reminder derived from it.
    pub fn delete_event(&self, username: &str, id: &str) -> RepoResult<Vec<CalendarEvent>> {
        let events = self.events.remove(username, id)?;
        self.notifications.delete_for_event(username, id)?;
        Ok(events)
    }

    pub fn events_on(&self, username: &str, date: NaiveDate) -> Vec<CalendarEvent> {
        self.events.list_on(username, date)
    }
}
