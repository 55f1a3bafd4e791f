//! Keyed JSON store over pluggable key/value backends.
//!
//! # Responsibility
//! - Derive partition keys from usernames.
//! - Serialize/deserialize whole collections as JSON under one key.
//!
//! # Invariants
//! - `read` never fails: missing or corrupt values yield `T::default()`.
//! - Per-user keys use the lowercased username, so partitions are shared by
//!   every casing of the same name.

use crate::model::user::username_key;
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Raw string storage addressed by key.
pub trait KvBackend {
    fn get_raw(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removing an absent key is a no-op.
    fn remove_raw(&self, key: &str) -> RepoResult<()>;
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn get_raw(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_raw(key, value)
    }

    fn remove_raw(&self, key: &str) -> RepoResult<()> {
        (**self).remove_raw(key)
    }
}

/// SQLite-backed storage using the `kv_entries` table.
#[derive(Clone, Copy)]
pub struct SqliteKvBackend<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvBackend<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `InvalidData` when the schema has not been migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let ready: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if ready != 1 {
            return Err(RepoError::InvalidData(
                "kv_entries table missing; open the connection with db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl KvBackend for SqliteKvBackend<'_> {
    fn get_raw(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local storage that disappears with its owner.
#[derive(Debug, Default)]
pub struct MemoryKvBackend {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryKvBackend {
    fn get_raw(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> RepoResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> RepoResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage key for one logical collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey {
    Tasks(String),
    Events(String),
    Notifications(String),
    Users,
    Session,
}

impl StoreKey {
    pub fn tasks(username: &str) -> Self {
        Self::Tasks(username_key(username))
    }

    pub fn events(username: &str) -> Self {
        Self::Events(username_key(username))
    }

    pub fn notifications(username: &str) -> Self {
        Self::Notifications(username_key(username))
    }

    /// Collection name without the user part; safe to log.
    pub fn partition(&self) -> &'static str {
        match self {
            Self::Tasks(_) => "tasks",
            Self::Events(_) => "events",
            Self::Notifications(_) => "notifications",
            Self::Users => "users",
            Self::Session => "session",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tasks(user) | Self::Events(user) | Self::Notifications(user) => {
                write!(f, "{}:{user}", self.partition())
            }
            Self::Users | Self::Session => write!(f, "{}", self.partition()),
        }
    }
}

/// JSON value store on top of a `KvBackend`.
pub struct KeyedLocalStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> KeyedLocalStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Reads and decodes the value under `key`.
    ///
    /// Backend failures and undecodable values are logged and replaced by
    /// `T::default()`.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &StoreKey) -> T {
        let raw = match self.backend.get_raw(&key.to_string()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(
                    "event=store_read module=store status=recovered partition={} error_code=backend_read_failed error={err}",
                    key.partition()
                );
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=store_read module=store status=recovered partition={} error_code=decode_failed error={err}",
                    key.partition()
                );
                T::default()
            }
        }
    }

    /// Encodes and stores `value` under `key`, replacing any previous value.
    pub fn write<T: Serialize + ?Sized>(&self, key: &StoreKey, value: &T) -> RepoResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.backend.set_raw(&key.to_string(), &encoded)
    }

    /// Drops the whole value under `key`.
    pub fn remove(&self, key: &StoreKey) -> RepoResult<()> {
        self.backend.remove_raw(&key.to_string())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyedLocalStore, KvBackend, MemoryKvBackend, StoreKey};

    #[test]
    fn keys_are_lowercased_per_user() {
        assert_eq!(StoreKey::tasks("Maria").to_string(), "tasks:maria");
        assert_eq!(StoreKey::events("MARIA").to_string(), "events:maria");
        assert_eq!(
            StoreKey::notifications("maria").to_string(),
            "notifications:maria"
        );
        assert_eq!(StoreKey::Users.to_string(), "users");
    }

    #[test]
    fn missing_key_reads_default() {
        let store = KeyedLocalStore::new(MemoryKvBackend::new());
        let values: Vec<String> = store.read(&StoreKey::tasks("nobody"));
        assert!(values.is_empty());
    }

    #[test]
    fn malformed_value_reads_default_instead_of_failing() {
        let backend = MemoryKvBackend::new();
        backend.set_raw("tasks:ana", "{not json").unwrap();
        let store = KeyedLocalStore::new(&backend);

        let values: Vec<String> = store.read(&StoreKey::tasks("Ana"));
        assert!(values.is_empty());
    }

    #[test]
    fn write_then_remove_clears_value() {
        let store = KeyedLocalStore::new(MemoryKvBackend::new());
        let key = StoreKey::events("ana");
        store.write(&key, &vec!["a".to_string()]).unwrap();
        assert_eq!(store.read::<Vec<String>>(&key), vec!["a".to_string()]);

        store.remove(&key).unwrap();
        assert!(store.backend().get_raw("events:ana").unwrap().is_none());
    }
}
