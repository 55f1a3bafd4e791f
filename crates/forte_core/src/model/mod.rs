//! Domain records for the weekly task board, calendar and reminders.
//!
//! # Responsibility
//! - Define the persisted record shapes and their JSON field names.
//! - Own input validation shared by the stores.
//!
//! # Invariants
//! - Record ids are unique inside their owning partition.
//! - Serialized field names are camelCase and must stay stable, since they
//!   are the persisted format.

pub mod event;
pub mod notification;
pub mod task;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier shared by tasks, events and notifications.
pub type RecordId = String;

const RECORD_ID_SUFFIX_LEN: usize = 9;

/// Builds a record id from a creation timestamp plus a random suffix.
///
/// Collision-resistant for one user editing from one place; not meant to be
/// globally unique.
pub fn new_record_id(now_epoch_ms: i64) -> RecordId {
    let random = Uuid::new_v4().simple().to_string();
    let suffix: String = random.chars().take(RECORD_ID_SUFFIX_LEN).collect();
    format!("{now_epoch_ms}-{suffix}")
}

/// Input validation failures for task and event writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTaskText,
    TaskTextTooLong { max_chars: usize, actual_chars: usize },
    EmptyEventTitle,
    InvalidDate(String),
    InvalidTime(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskText => write!(f, "task text must not be empty"),
            Self::TaskTextTooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "task text is {actual_chars} characters long, maximum is {max_chars}"
            ),
            Self::EmptyEventTitle => write!(f, "event title must not be empty"),
            Self::InvalidDate(value) => write!(f, "invalid event date `{value}`, expected YYYY-MM-DD"),
            Self::InvalidTime(value) => write!(f, "invalid event time `{value}`, expected HH:mm"),
        }
    }
}

impl Error for ValidationError {}
