//! Core domain logic for the Forte Itapema planner.
//! This crate is the single source of truth for task, calendar, reminder and
//! account invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::event::{CalendarEvent, EventPatch, NewEvent};
pub use model::notification::{Notification, NotificationSummary};
pub use model::task::{DayOfWeek, Task, TaskPatch, TASK_TEXT_MAX_CHARS};
pub use model::user::{Session, User};
pub use model::{RecordId, ValidationError};
pub use repo::event_repo::EventStore;
pub use repo::kv_store::{KeyedLocalStore, KvBackend, MemoryKvBackend, SqliteKvBackend, StoreKey};
pub use repo::listeners::Subscription;
pub use repo::notification_repo::NotificationStore;
pub use repo::task_repo::TaskStore;
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::CalendarService;
pub use service::notification_poller::{NotificationPoller, DEFAULT_POLL_INTERVAL};
pub use service::notification_service::NotificationEngine;
pub use service::task_board::group_by_day;
pub use service::user_directory::{
    AuthError, AuthResult, UserDirectory, MIN_PASSWORD_CHARS, RESERVED_ADMIN_USERNAME,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
