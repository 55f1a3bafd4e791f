//! Directory and session records.

use serde::{Deserialize, Serialize};

/// Public view of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display casing as typed at sign-up.
    pub username: String,
    pub is_admin: bool,
}

/// Active login for the current process. Cleared on logout.
pub type Session = User;

/// Persisted directory entry.
///
/// The credential is kept verbatim: a placeholder, not a password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredUser {
    pub username: String,
    pub password_placeholder: String,
    pub is_admin: bool,
}

impl StoredUser {
    pub fn to_user(&self) -> User {
        User {
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Lookup key for a username: lookups are case-insensitive.
pub fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}
