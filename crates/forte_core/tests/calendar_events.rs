use chrono::NaiveDate;
use forte_core::db::open_db_in_memory;
use forte_core::{
    CalendarService, EventPatch, EventStore, FixedClock, NewEvent, NotificationEngine, RepoError,
    SqliteKvBackend, ValidationError,
};
use std::sync::{Arc, Mutex};

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(
        NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
        8,
    ))
}

#[test]
fn add_update_remove_sequence_returns_exact_collection() {
    let conn = open_db_in_memory().unwrap();
    let store = EventStore::with_clock(SqliteKvBackend::try_new(&conn).unwrap(), clock());

    let events = store
        .add(
            "ana",
            NewEvent::new("2026-06-12", "Culto").with_time("19:30"),
        )
        .unwrap();
    assert_eq!(events.len(), 1);
    let events = store
        .add(
            "ana",
            NewEvent::new("2026-06-13", "Mutirão").with_description("Trazer luvas"),
        )
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].description.as_deref(), Some("Trazer luvas"));

    let first_id = events[0].id.clone();
    let updated = store
        .update(
            "ana",
            &first_id,
            &EventPatch::title("Culto especial").with_time(None),
        )
        .unwrap();
    assert_eq!(updated[0].title, "Culto especial");
    assert_eq!(updated[0].time, None);
    assert_eq!(updated[0].date, "2026-06-12");
    assert_eq!(updated[1], events[1]);

    let remaining = store.remove("ana", &first_id).unwrap();
    assert_eq!(remaining, vec![events[1].clone()]);
    assert_eq!(store.list("ANA"), remaining);
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let store = EventStore::new(SqliteKvBackend::try_new(&conn).unwrap());

    let err = store
        .add("ana", NewEvent::new("12/06/2026", "Culto"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidDate(_))
    ));

    let err = store.add("ana", NewEvent::new("2026-06-12", " ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyEventTitle)
    ));
    assert!(store.list("ana").is_empty());

    let id = store
        .add("ana", NewEvent::new("2026-06-12", "Culto"))
        .unwrap()[0]
        .id
        .clone();
    let err = store
        .update("ana", &id, &EventPatch::title("Culto").with_time(Some("7pm".to_string())))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidTime(_))
    ));
    assert_eq!(store.list("ana")[0].time, None);
}

#[test]
fn day_view_lists_untimed_events_first_then_by_time() {
    let conn = open_db_in_memory().unwrap();
    let store = EventStore::with_clock(SqliteKvBackend::try_new(&conn).unwrap(), clock());

    store
        .add("ana", NewEvent::new("2026-06-12", "Noite").with_time("20:00"))
        .unwrap();
    store
        .add("ana", NewEvent::new("2026-06-12", "Manhã").with_time("08:15"))
        .unwrap();
    store.add("ana", NewEvent::new("2026-06-12", "Dia todo")).unwrap();
    store.add("ana", NewEvent::new("2026-06-13", "Outro dia")).unwrap();

    let day = store.list_on("ana", NaiveDate::from_ymd_opt(2026, 6, 12).unwrap());
    let titles: Vec<&str> = day.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, vec!["Dia todo", "Manhã", "Noite"]);
}

#[test]
fn deleting_event_removes_only_its_notifications() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteKvBackend::try_new(&conn).unwrap();
    let events = EventStore::with_clock(backend, clock());
    let engine = NotificationEngine::with_clock(backend, clock());
    let calendar = CalendarService::new(&events, &engine);

    calendar
        .add_event("ana", NewEvent::new("2026-06-10", "Hoje"))
        .unwrap();
    let added = calendar
        .add_event("ana", NewEvent::new("2026-06-11", "Amanhã"))
        .unwrap();
    let today_id = added[0].id.clone();
    let tomorrow_id = added[1].id.clone();

    let notifications = engine.derive_and_merge("ana").unwrap();
    assert_eq!(notifications.len(), 2);

    let remaining_events = calendar.delete_event("ana", &today_id).unwrap();
    assert_eq!(remaining_events.len(), 1);

    let remaining = engine.list("ana");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].event_id, tomorrow_id);
    assert!(remaining.iter().all(|item| item.event_id != today_id));
}

#[test]
fn event_subscribers_see_calendar_writes_and_no_replay() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteKvBackend::try_new(&conn).unwrap();
    let events = EventStore::with_clock(backend, clock());
    let engine = NotificationEngine::with_clock(backend, clock());
    let calendar = CalendarService::new(&events, &engine);
    let first = calendar
        .add_event("ana", NewEvent::new("2026-06-10", "Culto"))
        .unwrap();

    let lengths = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&lengths);
    let subscription = events.subscribe(move |user, items| {
        seen.lock().unwrap().push((user.to_string(), items.len()));
    });
    assert!(lengths.lock().unwrap().is_empty());

    calendar
        .add_event("ana", NewEvent::new("2026-06-12", "Ensaio"))
        .unwrap();
    calendar
        .update_event("ana", &first[0].id, &EventPatch::title("Culto de domingo"))
        .unwrap();
    calendar.delete_event("ana", &first[0].id).unwrap();

    let ana = |len| ("ana".to_string(), len);
    assert_eq!(*lengths.lock().unwrap(), vec![ana(2), ana(2), ana(1)]);

    subscription.unsubscribe();
    calendar
        .add_event("ana", NewEvent::new("2026-06-13", "Outro"))
        .unwrap();
    assert_eq!(lengths.lock().unwrap().len(), 3);
}
