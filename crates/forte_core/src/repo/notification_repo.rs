//! Raw persistence for the `notifications:<user>` partition.
//!
//! Derivation rules live in `service::notification_service`.

use crate::model::notification::Notification;
use crate::repo::kv_store::{KeyedLocalStore, KvBackend, StoreKey};
use crate::repo::RepoResult;

pub struct NotificationStore<B: KvBackend> {
    store: KeyedLocalStore<B>,
}

impl<B: KvBackend> NotificationStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            store: KeyedLocalStore::new(backend),
        }
    }

    pub fn load(&self, username: &str) -> Vec<Notification> {
        self.store.read(&StoreKey::notifications(username))
    }

    pub fn save(&self, username: &str, notifications: &[Notification]) -> RepoResult<()> {
        self.store
            .write(&StoreKey::notifications(username), notifications)
    }

    pub fn remove_all_for_user(&self, username: &str) -> RepoResult<()> {
        self.store.remove(&StoreKey::notifications(username))
    }
}
