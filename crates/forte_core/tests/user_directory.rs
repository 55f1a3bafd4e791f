use chrono::NaiveDate;
use forte_core::db::open_db_in_memory;
use forte_core::{
    AuthError, DayOfWeek, EventStore, FixedClock, KvBackend, NewEvent, NotificationEngine,
    SqliteKvBackend, TaskStore, User, UserDirectory, RESERVED_ADMIN_USERNAME,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn admin() -> User {
    User {
        username: RESERVED_ADMIN_USERNAME.to_string(),
        is_admin: true,
    }
}

/// Per-user stores shared between the directory and the test's subscribers.
struct Stores<'c> {
    backend: SqliteKvBackend<'c>,
    tasks: TaskStore<SqliteKvBackend<'c>>,
    events: EventStore<SqliteKvBackend<'c>>,
    notifications: NotificationEngine<SqliteKvBackend<'c>>,
}

impl<'c> Stores<'c> {
    fn new(conn: &'c Connection) -> Self {
        Self::with_backend(SqliteKvBackend::try_new(conn).unwrap())
    }

    fn with_backend(backend: SqliteKvBackend<'c>) -> Self {
        let clock = Arc::new(FixedClock::at(
            NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            9,
        ));
        Self {
            backend,
            tasks: TaskStore::with_clock(backend, clock.clone()),
            events: EventStore::with_clock(backend, clock.clone()),
            notifications: NotificationEngine::with_clock(backend, clock),
        }
    }

    fn directory(&self) -> UserDirectory<'_, SqliteKvBackend<'c>> {
        UserDirectory::new(self.backend, &self.tasks, &self.events, &self.notifications)
    }
}

#[test]
fn admin_is_seeded_and_can_log_in() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();

    let session = directory.login("emerson", "sccp").unwrap();
    assert_eq!(session.username, "Emerson");
    assert!(session.is_admin);
    assert_eq!(directory.current_session(), Some(session));
}

#[test]
fn legacy_admin_record_is_migrated_out() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteKvBackend::try_new(&conn).unwrap();
    backend
        .set_raw(
            "users",
            r#"{"admin":{"username":"admin","passwordPlaceholder":"admin","isAdmin":true}}"#,
        )
        .unwrap();
    let stores = Stores::with_backend(backend);
    let directory = stores.directory();

    assert!(matches!(
        directory.login("admin", "admin"),
        Err(AuthError::InvalidCredentials)
    ));
    let users = directory.list_users(&admin()).unwrap();
    assert_eq!(users, vec![admin()]);
}

#[test]
fn sign_up_rejects_reserved_name_in_any_casing() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();

    for name in ["Emerson", "emerson", "EMERSON", " eMeRsOn "] {
        let err = directory.sign_up(name, "x").unwrap_err();
        assert!(matches!(err, AuthError::ReservedName(_)), "{name}");
    }
}

#[test]
fn sign_up_validates_and_rejects_duplicates_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();

    assert!(matches!(
        directory.sign_up("", "secret"),
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        directory.sign_up("Ana", ""),
        Err(AuthError::Validation(_))
    ));

    let session = directory.sign_up("Ana", "secret").unwrap();
    assert_eq!(session.username, "Ana");
    assert!(!session.is_admin);
    assert_eq!(directory.current_session(), Some(session));

    assert!(matches!(
        directory.sign_up("ANA", "other"),
        Err(AuthError::DuplicateUser(_))
    ));
}

#[test]
fn login_is_case_insensitive_on_username_only() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();
    directory.sign_up("Ana", "secret").unwrap();
    directory.logout().unwrap();
    assert_eq!(directory.current_session(), None);

    let session = directory.login("aNa", "secret").unwrap();
    assert_eq!(session.username, "Ana");

    assert!(matches!(
        directory.login("ana", "SECRET"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        directory.login("nobody", "secret"),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn change_password_checks_old_credential_and_strength() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();
    directory.sign_up("Ana", "secret").unwrap();

    assert!(matches!(
        directory.change_password("ana", "wrong", "longer"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        directory.change_password("ana", "secret", "abc"),
        Err(AuthError::WeakPassword { min_chars: 4 })
    ));

    directory.change_password("ANA", "secret", "abcd").unwrap();
    assert!(directory.login("ana", "secret").is_err());
    assert!(directory.login("ana", "abcd").is_ok());
}

#[test]
fn admin_operations_enforce_permissions() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();
    let ana = directory.sign_up("Ana", "secret").unwrap();

    assert!(matches!(
        directory.list_users(&ana),
        Err(AuthError::AccessDenied)
    ));
    assert!(matches!(
        directory.delete_user(&ana, "Emerson"),
        Err(AuthError::AccessDenied)
    ));
    assert!(matches!(
        directory.delete_user(&admin(), "EMERSON"),
        Err(AuthError::SelfDelete)
    ));
    assert!(matches!(
        directory.delete_user(&admin(), "ghost"),
        Err(AuthError::NotFound(_))
    ));

    let users = directory.list_users(&admin()).unwrap();
    let names: Vec<&str> = users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Emerson"]);
}

#[test]
fn delete_user_cascades_into_all_partitions() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();
    directory.sign_up("Ana", "secret").unwrap();
    directory.sign_up("Bruno", "secret").unwrap();

    for user in ["Ana", "Bruno"] {
        stores.tasks.add(user, "Limpar", DayOfWeek::Monday).unwrap();
        stores
            .events
            .add(user, NewEvent::new("2026-06-10", "Culto"))
            .unwrap();
        stores.notifications.derive_and_merge(user).unwrap();
    }
    assert!(stores.backend.get_raw("notifications:ana").unwrap().is_some());

    directory.delete_user(&admin(), "ANA").unwrap();

    for key in ["tasks:ana", "events:ana", "notifications:ana"] {
        assert!(
            stores.backend.get_raw(key).unwrap().is_none(),
            "{key} survived"
        );
    }
    assert_eq!(stores.tasks.list("bruno").len(), 1);
    assert_eq!(stores.events.list("bruno").len(), 1);
    assert_eq!(stores.notifications.list("bruno").len(), 1);
    assert!(matches!(
        directory.login("ana", "secret"),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn delete_user_is_seen_by_store_subscribers() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::new(&conn);
    let directory = stores.directory();
    directory.sign_up("Ana", "secret").unwrap();

    let task_lengths = Arc::new(Mutex::new(Vec::new()));
    let event_lengths = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&task_lengths);
    let task_feed = stores.tasks.subscribe(move |_, tasks| {
        seen.lock().unwrap().push(tasks.len());
    });
    let seen = Arc::clone(&event_lengths);
    let event_feed = stores.events.subscribe(move |_, events| {
        seen.lock().unwrap().push(events.len());
    });

    stores.tasks.add("ana", "Limpar", DayOfWeek::Monday).unwrap();
    stores
        .events
        .add("ana", NewEvent::new("2026-06-11", "Ensaio"))
        .unwrap();
    directory.delete_user(&admin(), "Ana").unwrap();

    assert_eq!(*task_lengths.lock().unwrap(), vec![1, 0]);
    assert_eq!(*event_lengths.lock().unwrap(), vec![1, 0]);
    task_feed.unsubscribe();
    event_feed.unsubscribe();
}
