//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `forte_core` linkage and database bootstrap without a UI.
//! - Print a deterministic status report for quick local sanity checks.
//!
//! Usage: `forte_cli [DB_PATH]`. Without a path the database lives in memory.

use forte_core::{
    CoreConfig, EventStore, NotificationEngine, SqliteKvBackend, TaskStore, UserDirectory,
    RESERVED_ADMIN_USERNAME,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("forte_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::with_db_path(path),
        None => CoreConfig::default(),
    };
    config.init_logging()?;

    let conn = config.open_db()?;
    let backend = SqliteKvBackend::try_new(&conn)?;
    let tasks = TaskStore::new(backend);
    let events = EventStore::new(backend);
    let engine = NotificationEngine::new(backend);
    let directory = UserDirectory::new(backend, &tasks, &events, &engine);
    let admin = directory.login(RESERVED_ADMIN_USERNAME, "sccp").ok();
    let user_count = match &admin {
        Some(session) => directory.list_users(session)?.len(),
        None => 0,
    };

    let mut poller = config.notification_poller();
    let admin_unread = match &admin {
        Some(session) => poller.force_poll(&engine, &session.username)?.unread,
        None => 0,
    };

    println!("forte_core version={}", forte_core::core_version());
    println!(
        "forte_core storage={}",
        if config.db_path.is_some() { "file" } else { "memory" }
    );
    println!("forte_core users={user_count}");
    println!("forte_core admin_default_credentials={}", admin.is_some());
    println!("forte_core admin_unread_notifications={admin_unread}");
    Ok(())
}
