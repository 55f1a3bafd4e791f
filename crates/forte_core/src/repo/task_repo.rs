//! Weekly task store.
//!
//! # Responsibility
//! - CRUD over one user's task list, persisted under `tasks:<user>`.
//! - Publish the full list to subscribers after every write.
//!
//! # Invariants
//! - Writes validate task text before touching storage.
//! - Updating or removing an unknown id leaves the list unchanged.

use crate::clock::{Clock, SystemClock};
use crate::model::new_record_id;
use crate::model::task::{validate_task_text, DayOfWeek, Task, TaskPatch};
use crate::repo::kv_store::{KeyedLocalStore, KvBackend, StoreKey};
use crate::repo::listeners::{Listeners, Subscription};
use crate::repo::RepoResult;
use log::debug;
use std::sync::Arc;

/// Per-user task lists over a keyed JSON store.
pub struct TaskStore<B: KvBackend> {
    store: KeyedLocalStore<B>,
    clock: Arc<dyn Clock>,
    listeners: Listeners<Task>,
}

impl<B: KvBackend> TaskStore<B> {
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

    /// Returns the user's tasks in insertion order.
    pub fn list(&self, username: &str) -> Vec<Task> {
        self.store.read(&StoreKey::tasks(username))
    }

    /// Appends a new incomplete task on `day`.
    ///
    /// # Errors
    /// - `Validation` when `text` is empty or longer than 100 characters.
    pub fn add(&self, username: &str, text: &str, day: DayOfWeek) -> RepoResult<Vec<Task>> {
        validate_task_text(text)?;
        let now = self.clock.now_epoch_ms();
        let mut tasks = self.list(username);
        tasks.push(Task {
            id: new_record_id(now),
            text: text.trim().to_string(),
            completed: false,
            created_at: now,
            day: day.as_str().to_string(),
        });
        self.persist(username, tasks)
    }

    /// Merges `patch` into the task with `id`.
    pub fn update(&self, username: &str, id: &str, patch: &TaskPatch) -> RepoResult<Vec<Task>> {
        if let Some(text) = &patch.text {
            validate_task_text(text)?;
        }
        let mut tasks = self.list(username);
        match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => patch.apply(task),
            None => debug!("event=task_update module=store status=noop reason=id_not_found"),
        }
        self.persist(username, tasks)
    }

    /// Flips the completion flag of the task with `id`.
    pub fn toggle(&self, username: &str, id: &str) -> RepoResult<Vec<Task>> {
        let mut tasks = self.list(username);
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            task.completed = !task.completed;
        }
        self.persist(username, tasks)
    }

    pub fn remove(&self, username: &str, id: &str) -> RepoResult<Vec<Task>> {
        let mut tasks = self.list(username);
        tasks.retain(|task| task.id != id);
        self.persist(username, tasks)
    }

    /// Drops the user's whole task partition.
    pub fn remove_all_for_user(&self, username: &str) -> RepoResult<()> {
        self.store.remove(&StoreKey::tasks(username))?;
        self.listeners.notify(username, &[]);
        Ok(())
    }

    /// Calls `callback` with the user's full list after every write,
    /// including cascade deletes. The current list is not replayed on
    /// subscribe; read it with `list` first.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<Task>
    where
        F: Fn(&str, &[Task]) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    fn persist(&self, username: &str, tasks: Vec<Task>) -> RepoResult<Vec<Task>> {
        self.store.write(&StoreKey::tasks(username), &tasks)?;
        self.listeners.notify(username, &tasks);
        Ok(tasks)
    }
}
