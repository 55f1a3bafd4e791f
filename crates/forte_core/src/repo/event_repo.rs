//! Calendar event store.
//!
//! # Responsibility
//! - CRUD over one user's events, persisted under `events:<user>`.
//! - Day view queries for the calendar.
//!
//! # Invariants
//! - Writes validate date, time and title before touching storage.
//! - Removing an event here does not touch notifications; use
//!   `CalendarService::delete_event` for the cascading delete.

use crate::clock::{Clock, SystemClock};
use crate::model::event::{CalendarEvent, EventPatch, NewEvent};
use crate::model::new_record_id;
use crate::repo::kv_store::{KeyedLocalStore, KvBackend, StoreKey};
use crate::repo::listeners::{Listeners, Subscription};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use std::sync::Arc;

/// Per-user event lists over a keyed JSON store.
pub struct EventStore<B: KvBackend> {
    store: KeyedLocalStore<B>,
    clock: Arc<dyn Clock>,
    listeners: Listeners<CalendarEvent>,
}

impl<B: KvBackend> EventStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: KeyedLocalStore::new(backend),
            clock,
            listeners: Listeners::new(),
        }
    }

    /// Returns the user's events in insertion order.
    pub fn list(&self, username: &str) -> Vec<CalendarEvent> {
        self.store.read(&StoreKey::events(username))
    }

    /// Events on one calendar day: untimed first, then by time, then by creation.
    pub fn list_on(&self, username: &str, date: NaiveDate) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> = self
            .list(username)
            .into_iter()
            .filter(|event| event.local_date() == Some(date))
            .collect();
        events.sort_by(|a, b| {
            a.time
                .cmp(&b.time)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        events
    }

    /// Appends a validated event.
    pub fn add(&self, username: &str, input: NewEvent) -> RepoResult<Vec<CalendarEvent>> {
        let now = self.clock.now_epoch_ms();
        let event = input.into_event(new_record_id(now), now)?;
        let mut events = self.list(username);
        events.push(event);
        self.persist(username, events)
    }

    /// Merges `patch` into the event with `id`; unknown ids are a no-op.
    pub fn update(
        &self,
        username: &str,
        id: &str,
        patch: &EventPatch,
    ) -> RepoResult<Vec<CalendarEvent>> {
        patch.validate()?;
        let mut events = self.list(username);
        if let Some(event) = events.iter_mut().find(|event| event.id == id) {
            patch.apply(event);
        }
        self.persist(username, events)
    }

    pub fn remove(&self, username: &str, id: &str) -> RepoResult<Vec<CalendarEvent>> {
        let mut events = self.list(username);
        events.retain(|event| event.id != id);
        self.persist(username, events)
    }

    /// Drops the user's whole event partition.
    pub fn remove_all_for_user(&self, username: &str) -> RepoResult<()> {
        self.store.remove(&StoreKey::events(username))?;
        self.listeners.notify(username, &[]);
        Ok(())
    }

    /// Calls `callback` with the user's full list after every write,
    /// including cascade deletes. The current list is not replayed on
    /// subscribe; read it with `list` first.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<CalendarEvent>
    where
        F: Fn(&str, &[CalendarEvent]) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    fn persist(
        &self,
        username: &str,
        events: Vec<CalendarEvent>,
    ) -> RepoResult<Vec<CalendarEvent>> {
        self.store.write(&StoreKey::events(username), &events)?;
        self.listeners.notify(username, &events);
        Ok(events)
    }
}
