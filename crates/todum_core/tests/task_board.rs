use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use todum_core::{
    AlertInbox, AlertPolicy, BoardError, BoardOptions, Clock, FixedClock, MemorySlotStore,
    OverdueAlert, SaveQueue, Task, TaskBoard, TaskChangeListener, TaskDraft, TaskId,
    TaskRepository,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
}

fn board_at(now: DateTime<Utc>, tasks: Vec<Task>) -> TaskBoard<FixedClock<Utc>> {
    TaskBoard::with_clock(tasks, FixedClock::new(now), BoardOptions::default())
}

/// Records the collection size seen by each notification.
#[derive(Clone, Default)]
struct Recorder {
    sizes: Arc<Mutex<Vec<usize>>>,
}

impl TaskChangeListener for Recorder {
    fn on_tasks_changed(&mut self, tasks: &[Task], _now: DateTime<Utc>) {
        self.sizes.lock().unwrap().push(tasks.len());
    }
}

#[test]
fn each_successful_mutation_notifies_once() {
    let mut board = board_at(start(), Vec::new());
    let recorder = Recorder::default();
    board.add_listener(recorder.clone());

    let id = board
        .add(TaskDraft::new("write report", "", start() + TimeDelta::hours(2)))
        .unwrap();
    board
        .edit(&id, TaskDraft::new("write summary", "", start() + TimeDelta::hours(3)))
        .unwrap();
    assert!(board.toggle(&id).unwrap());
    board.delete(&id).unwrap();

    assert_eq!(*recorder.sizes.lock().unwrap(), vec![1, 1, 1, 0]);
}

#[test]
fn rejected_operations_do_not_notify() {
    let mut board = board_at(start(), Vec::new());
    let recorder = Recorder::default();
    board.add_listener(recorder.clone());
    let missing = TaskId::parse("missing").unwrap();

    assert!(board.add(TaskDraft::new(" ", "", start())).is_err());
    assert_eq!(
        board.toggle(&missing).unwrap_err(),
        BoardError::NotFound(missing.clone())
    );
    assert!(board.edit(&missing, TaskDraft::new("x", "", start())).is_err());
    assert!(board.delete(&missing).is_err());

    assert!(recorder.sizes.lock().unwrap().is_empty());
}

#[test]
fn edit_keeps_identity_and_completion() {
    let mut board = board_at(start(), Vec::new());
    let id = board
        .add(TaskDraft::new("draft", "", start() + TimeDelta::hours(1)))
        .unwrap();
    board.toggle(&id).unwrap();

    let new_due = start() + TimeDelta::days(2);
    board
        .edit(&id, TaskDraft::new("  final  ", " notes ", new_due))
        .unwrap();

    let task = board.get(&id).unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.title, "final");
    assert_eq!(task.description, " notes ");
    assert_eq!(task.due_date, new_due);
    assert!(task.completed);
}

#[test]
fn edit_rejects_blank_title_and_keeps_task() {
    let mut board = board_at(start(), Vec::new());
    let id = board.add(TaskDraft::new("keep", "", start())).unwrap();

    assert!(board.edit(&id, TaskDraft::new("\t", "", start())).is_err());
    assert_eq!(board.get(&id).unwrap().title, "keep");
}

#[test]
fn duplicate_ids_are_rejected_on_add_and_dropped_on_load() {
    let id = TaskId::parse("1").unwrap();
    let loaded = vec![
        Task::with_id(id.clone(), "first", "", start()),
        Task::with_id(id.clone(), "second", "", start()),
    ];
    let mut board = board_at(start(), loaded);
    assert_eq!(board.len(), 1);

    let err = board
        .add_with_id(id.clone(), TaskDraft::new("third", "", start()))
        .unwrap_err();
    assert_eq!(err, BoardError::DuplicateId(id));
}

#[test]
fn two_step_delete_requires_confirmation() {
    let mut board = board_at(start(), Vec::new());
    let keep = board.add(TaskDraft::new("keep", "", start())).unwrap();
    let drop_me = board.add(TaskDraft::new("drop", "", start())).unwrap();

    board.request_delete(&drop_me).unwrap();
    assert_eq!(board.pending_delete(), Some(&drop_me));
    assert_eq!(board.cancel_delete(), Some(drop_me.clone()));
    assert_eq!(board.len(), 2);

    board.request_delete(&drop_me).unwrap();
    let removed = board.confirm_delete().unwrap();
    assert_eq!(removed.id, drop_me);
    assert_eq!(board.pending_delete(), None);
    assert!(board.get(&keep).is_some());
    assert_eq!(board.len(), 1);

    let missing = TaskId::parse("missing").unwrap();
    assert_eq!(
        board.request_delete(&missing).unwrap_err(),
        BoardError::NotFound(missing)
    );
}

#[test]
fn grouped_view_tracks_clock() {
    let clock = FixedClock::new(start());
    let mut board = TaskBoard::with_clock(Vec::new(), clock.clone(), BoardOptions::default());
    board
        .add(TaskDraft::new("call", "", start() + TimeDelta::hours(1)))
        .unwrap();

    assert_eq!(board.grouped().labels(), vec!["Today"]);

    clock.advance(TimeDelta::hours(2));
    assert_eq!(board.grouped().labels(), vec!["Overdue"]);
    assert_eq!(board.overdue_count(), 1);
    assert_eq!(board.clock().now(), start() + TimeDelta::hours(2));
}

#[test]
fn every_change_policy_alerts_on_each_mutation_with_overdue_tasks() {
    let late = Task::new("late", "", start() - TimeDelta::hours(1));
    let mut board = board_at(start(), vec![late]);
    let inbox = AlertInbox::new();
    board.attach_alerts(inbox.clone());

    board.notify_loaded();
    board
        .add(TaskDraft::new("fresh", "", start() + TimeDelta::hours(1)))
        .unwrap();

    assert_eq!(inbox.drain(), vec![OverdueAlert { count: 1 }; 2]);
    assert!(inbox.is_empty());
}

#[test]
fn on_increase_policy_alerts_only_when_count_rises() {
    let options = BoardOptions {
        alert_policy: AlertPolicy::OnIncrease,
        ..BoardOptions::default()
    };
    let late = Task::new("late", "", start() - TimeDelta::hours(1));
    let mut board = TaskBoard::with_clock(vec![late], FixedClock::new(start()), options);
    let inbox = AlertInbox::new();
    board.attach_alerts(inbox.clone());

    board.notify_loaded();
    board
        .add(TaskDraft::new("fresh", "", start() + TimeDelta::hours(1)))
        .unwrap();
    board
        .add(TaskDraft::new("missed", "", start() - TimeDelta::hours(3)))
        .unwrap();

    let counts: Vec<usize> = inbox.drain().into_iter().map(|a| a.count).collect();
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn completing_the_only_overdue_task_stops_alerts() {
    let late = Task::new("late", "", start() - TimeDelta::hours(1));
    let late_id = late.id.clone();
    let mut board = board_at(start(), vec![late]);
    let inbox = AlertInbox::new();
    board.attach_alerts(inbox.clone());

    board.toggle(&late_id).unwrap();
    assert!(inbox.is_empty());
}

#[test]
fn board_changes_persist_through_save_queue() {
    let store = MemorySlotStore::new();
    let queue = SaveQueue::spawn(TaskRepository::new(store.clone())).unwrap();
    let mut board = board_at(start(), TaskRepository::new(store.clone()).load());
    board.add_listener(queue.handle());

    let a = board
        .add(TaskDraft::new("a", "", start() + TimeDelta::hours(1)))
        .unwrap();
    let b = board
        .add(TaskDraft::new("b", "", start() + TimeDelta::days(1)))
        .unwrap();
    board.toggle(&a).unwrap();
    board.delete(&b).unwrap();
    assert!(queue.flush());

    let reloaded = TaskRepository::new(store).load();
    assert_eq!(reloaded, board.tasks().to_vec());
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded[0].completed);
}
