//! Use-case services over the stores.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs (reminders, calendar
//!   cascades, board views, accounts).
//! - Keep callers decoupled from storage keys and JSON layout.

pub mod calendar_service;
pub mod notification_poller;
pub mod notification_service;
pub mod task_board;
pub mod user_directory;
