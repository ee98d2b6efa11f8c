use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use todum_core::{count_overdue, is_overdue, Task, OVERDUE_GRACE_MS};

#[test]
fn completed_tasks_are_never_overdue() {
    let due = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let task = Task::new("old", "", due).completed(true);

    for now in [
        due - TimeDelta::days(1),
        due,
        due + TimeDelta::days(1),
        due + TimeDelta::days(3650),
    ] {
        assert!(!is_overdue(&task, now));
    }
}

#[test]
fn grace_boundary_is_exclusive() {
    let due = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
    let task = Task::new("standup", "", due);

    assert!(!is_overdue(&task, due));
    assert!(!is_overdue(
        &task,
        due + TimeDelta::milliseconds(OVERDUE_GRACE_MS)
    ));
    assert!(is_overdue(
        &task,
        due + TimeDelta::milliseconds(OVERDUE_GRACE_MS + 1)
    ));
}

#[test]
fn future_tasks_are_not_overdue() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
    let task = Task::new("later", "", now + TimeDelta::hours(2));
    assert!(!is_overdue(&task, now));
}

#[test]
fn count_overdue_matches_filter() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
    let tasks = vec![
        Task::new("a", "", now - TimeDelta::hours(1)),
        Task::new("b", "", now - TimeDelta::minutes(4)),
        Task::new("c", "", now - TimeDelta::minutes(6)),
        Task::new("d", "", now - TimeDelta::hours(1)).completed(true),
    ];
    assert_eq!(count_overdue(&tasks, now), 2);
    assert_eq!(count_overdue(&[], now), 0);
}

#[test]
fn due_dates_at_calendar_edges_do_not_overflow() {
    let now = Utc::now();
    let last = Task::new("far", "", DateTime::<Utc>::MAX_UTC - TimeDelta::milliseconds(1));
    let first = Task::new("ancient", "", DateTime::<Utc>::MIN_UTC);

    assert!(!is_overdue(&last, now));
    assert!(is_overdue(&first, now));
    assert_eq!(count_overdue(&[last, first], now), 1);
}
