//! Account directory, sessions and admin operations.
//!
//! # Responsibility
//! - Sign-up, login, logout and password change against the global `users`
//!   table.
//! - Admin listing and deletion, cascading into the user's task, event and
//!   notification partitions.
//! - Seed the reserved administrator on every load.
//!
//! # Invariants
//! - Usernames are unique case-insensitively; display casing is preserved.
//! - The reserved administrator name can never be claimed by sign-up.
//! - Credentials are stored verbatim. This is a placeholder, not hashing.

use crate::model::user::{username_key, Session, StoredUser, User};
use crate::repo::event_repo::EventStore;
use crate::repo::kv_store::{KeyedLocalStore, KvBackend, MemoryKvBackend, StoreKey};
use crate::repo::task_repo::TaskStore;
use crate::repo::{RepoError, RepoResult};
use crate::service::notification_service::NotificationEngine;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display name of the seeded administrator.
pub const RESERVED_ADMIN_USERNAME: &str = "Emerson";
const RESERVED_ADMIN_PASSWORD: &str = "sccp";
/// Directory key of the administrator record from earlier releases.
const LEGACY_ADMIN_KEY: &str = "admin";
/// Minimum accepted length, in characters, for a changed password.
pub const MIN_PASSWORD_CHARS: usize = 4;

pub type AuthResult<T> = Result<T, AuthError>;

/// Account operation failures. `Display` yields short user-facing text.
#[derive(Debug)]
pub enum AuthError {
    Validation(&'static str),
    DuplicateUser(String),
    ReservedName(String),
    InvalidCredentials,
    WeakPassword { min_chars: usize },
    AccessDenied,
    SelfDelete,
    NotFound(String),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::DuplicateUser(username) => write!(f, "username `{username}` already exists"),
            Self::ReservedName(username) => write!(f, "username `{username}` is reserved"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::WeakPassword { min_chars } => {
                write!(f, "new password must have at least {min_chars} characters")
            }
            Self::AccessDenied => write!(f, "access denied: administrators only"),
            Self::SelfDelete => write!(f, "you cannot delete your own account"),
            Self::NotFound(username) => write!(f, "user `{username}` not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

type UserTable = BTreeMap<String, StoredUser>;

/// Process-scoped login state, the equivalent of a browser tab session.
pub struct SessionStore {
    store: KeyedLocalStore<MemoryKvBackend>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            store: KeyedLocalStore::new(MemoryKvBackend::new()),
        }
    }
}

impl SessionStore {
    pub fn current(&self) -> Option<Session> {
        self.store.read(&StoreKey::Session)
    }

    fn establish(&self, session: &Session) -> RepoResult<()> {
        self.store.write(&StoreKey::Session, session)
    }

    fn clear(&self) -> RepoResult<()> {
        self.store.remove(&StoreKey::Session)
    }
}

/// Global user table plus the per-user stores it cascades into.
///
/// The task, event and notification stores are borrowed so that cascade
/// deletes reach the same change feeds the caller subscribed to.
pub struct UserDirectory<'s, B: KvBackend> {
    users: KeyedLocalStore<B>,
    tasks: &'s TaskStore<B>,
    events: &'s EventStore<B>,
    notifications: &'s NotificationEngine<B>,
    session: SessionStore,
}

impl<'s, B: KvBackend> UserDirectory<'s, B> {
    /// Builds a directory whose user table lives in `users_backend`.
    pub fn new(
        users_backend: B,
        tasks: &'s TaskStore<B>,
        events: &'s EventStore<B>,
        notifications: &'s NotificationEngine<B>,
    ) -> Self {
        Self {
            users: KeyedLocalStore::new(users_backend),
            tasks,
            events,
            notifications,
            session: SessionStore::default(),
        }
    }

    /// Creates a regular account and logs it in.
    ///
    /// # Errors
    /// - `Validation` when username or password is empty.
    /// - `ReservedName` for any casing of the administrator name.
    /// - `DuplicateUser` when the lowercased username is taken.
    pub fn sign_up(&self, username: &str, password: &str) -> AuthResult<Session> {
        let display_name = username.trim();
        if display_name.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("username and password are required"));
        }
        let key = username_key(display_name);
        if key == username_key(RESERVED_ADMIN_USERNAME) {
            return Err(AuthError::ReservedName(display_name.to_string()));
        }

        let mut users = self.load_users()?;
        if users.contains_key(&key) {
            return Err(AuthError::DuplicateUser(display_name.to_string()));
        }

        let record = StoredUser {
            username: display_name.to_string(),
            password_placeholder: password.to_string(),
            is_admin: false,
        };
        let session = record.to_user();
        users.insert(key, record);
        self.save_users(&users)?;
        self.session.establish(&session)?;

        info!("event=auth_sign_up module=auth status=ok");
        Ok(session)
    }

    /// Checks credentials and logs the user in.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<Session> {
        let users = self.load_users()?;
        let session = match users.get(&username_key(username)) {
            Some(user) if credentials_match(&user.password_placeholder, password) => {
                user.to_user()
            }
            _ => {
                warn!("event=auth_login module=auth status=error error_code=invalid_credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };
        self.session.establish(&session)?;
        info!("event=auth_login module=auth status=ok is_admin={}", session.is_admin);
        Ok(session)
    }

    pub fn logout(&self) -> AuthResult<()> {
        self.session.clear()?;
        Ok(())
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.current()
    }

    /// Replaces the credential after verifying the old one.
    ///
    /// # Errors
    /// - `InvalidCredentials` when the user is unknown or `old_password` is wrong.
    /// - `WeakPassword` when `new_password` is shorter than `MIN_PASSWORD_CHARS`.
    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let mut users = self.load_users()?;
        let user = users
            .get_mut(&username_key(username))
            .filter(|user| credentials_match(&user.password_placeholder, old_password))
            .ok_or(AuthError::InvalidCredentials)?;
        if new_password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword {
                min_chars: MIN_PASSWORD_CHARS,
            });
        }

        user.password_placeholder = new_password.to_string();
        self.save_users(&users)?;
        info!("event=auth_change_password module=auth status=ok");
        Ok(())
    }

    /// All accounts, ordered by lowercased username. Admin only.
    pub fn list_users(&self, acting: &User) -> AuthResult<Vec<User>> {
        if !acting.is_admin {
            return Err(AuthError::AccessDenied);
        }
        Ok(self
            .load_users()?
            .values()
            .map(StoredUser::to_user)
            .collect())
    }

    /// Deletes an account and every partition it owns. Admin only.
    ///
    /// # Errors
    /// - `AccessDenied` when `acting` is not an administrator.
    /// - `SelfDelete` when the target is the acting user.
    /// - `NotFound` when the target does not exist.
    pub fn delete_user(&self, acting: &User, target_username: &str) -> AuthResult<()> {
        if !acting.is_admin {
            return Err(AuthError::AccessDenied);
        }
        let key = username_key(target_username);
        if username_key(&acting.username) == key {
            return Err(AuthError::SelfDelete);
        }

        let mut users = self.load_users()?;
        if users.remove(&key).is_none() {
            return Err(AuthError::NotFound(target_username.to_string()));
        }
        self.save_users(&users)?;

        self.tasks.remove_all_for_user(target_username)?;
        self.events.remove_all_for_user(target_username)?;
        self.notifications.delete_all_for_user(target_username)?;

        info!("event=auth_delete_user module=auth status=ok remaining_users={}", users.len());
        Ok(())
    }

    /// Loads the table, applying the administrator seed and legacy cleanup.
    fn load_users(&self) -> AuthResult<UserTable> {
        let mut users: UserTable = self.users.read(&StoreKey::Users);
        if seed_admin(&mut users) {
            self.save_users(&users)?;
        }
        Ok(users)
    }

    fn save_users(&self, users: &UserTable) -> AuthResult<()> {
        self.users.write(&StoreKey::Users, users)?;
        Ok(())
    }
}

/// Drops the legacy admin record and inserts the reserved administrator if
/// missing. Returns whether the table changed.
fn seed_admin(users: &mut UserTable) -> bool {
    let mut changed = users.remove(LEGACY_ADMIN_KEY).is_some();
    let admin_key = username_key(RESERVED_ADMIN_USERNAME);
    if !users.contains_key(&admin_key) {
        info!("event=auth_seed_admin module=auth status=ok");
        users.insert(
            admin_key,
            StoredUser {
                username: RESERVED_ADMIN_USERNAME.to_string(),
                password_placeholder: RESERVED_ADMIN_PASSWORD.to_string(),
                is_admin: true,
            },
        );
        changed = true;
    }
    changed
}

/// Compares without short-circuiting on the first differing byte.
fn credentials_match(stored: &str, provided: &str) -> bool {
    let stored = stored.as_bytes();
    let provided = provided.as_bytes();
    if stored.len() != provided.len() {
        return false;
    }
    stored
        .iter()
        .zip(provided)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
