//! Runtime configuration for embedding the planner core.
//!
//! # Invariants
//! - The default configuration touches no files: in-memory database and no
//!   file logging.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{init_logging, LogLevel, LoggingError};
use crate::service::notification_poller::{NotificationPoller, DEFAULT_POLL_INTERVAL};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// Storage, logging and refresh settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Database file; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Absolute directory for rotating log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub notification_poll_interval: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: LogLevel::build_default(),
            log_dir: None,
            notification_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl CoreConfig {
    /// Default configuration persisting to `db_path`.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(db_path.into()),
            ..Self::default()
        }
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Starts file logging when `log_dir` is set; otherwise does nothing.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(self.log_level.as_str(), dir),
            None => Ok(()),
        }
    }

    pub fn notification_poller(&self) -> NotificationPoller {
        NotificationPoller::new(self.notification_poll_interval)
    }
}
