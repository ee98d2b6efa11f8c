//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task board operations to Dart via FRB.
//! - Keep one task session (board + save queue + alert inbox) per process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Timestamps cross the boundary as Unix epoch milliseconds.
//! - Storage failures degrade to an in-memory session; they are reported in
//!   the response message, never thrown.

use chrono::{Local, Utc};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use todum_core::model::task::due_date_from_epoch_ms;
use todum_core::Clock;
use todum_core::{
    core_version as core_version_inner, format_due_time, init_logging as init_logging_inner,
    is_overdue, ping as ping_inner, AlertInbox, BoardError, GroupKey, KeyValueStore,
    MemorySlotStore, OverdueAlert, SaveQueue, SqliteSlotStore, Task, TaskBoard, TaskDraft,
    TaskGroup, TaskId, TaskRepository,
};

const DB_FILE_NAME: &str = "todum_tasks.sqlite3";
const DB_PATH_ENV: &str = "TODUM_DB_PATH";
const EMPTY_STATE_MESSAGE: &str = "No tasks yet. Add a new task!";

static SESSION: OnceCell<Mutex<TaskSession>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One task row as shown by the list UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_epoch_ms: i64,
    /// Local wall-clock due time, `HH:MM`.
    pub due_time: String,
    pub overdue: bool,
}

/// One labeled section of the grouped task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSection {
    /// Stable section kind: `overdue|today|tomorrow|day|completed`.
    pub kind: String,
    /// Display header (`Today`, `Monday, Jan 5`, ...).
    pub label: String,
    pub items: Vec<TaskItem>,
}

/// Grouped list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub sections: Vec<TaskSection>,
    pub total: u32,
    pub overdue_count: u32,
    /// Empty-state text when there are no sections, otherwise empty.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task_id: Option<String>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Overdue alert ready for a modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueAlertItem {
    pub title: String,
    pub message: String,
    pub count: u32,
}

/// Opens the task session, loading the persisted collection once.
///
/// # FFI contract
/// - `db_path = None` resolves `TODUM_DB_PATH`, then the temp directory.
/// - Repeated calls with the same path are no-ops; a different path fails.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_open(db_path: Option<String>) -> TaskActionResponse {
    let path = resolve_db_path(db_path.as_deref());
    if let Some(session) = SESSION.get() {
        let session = session.lock().unwrap_or_else(PoisonError::into_inner);
        return if session.db_path == path {
            TaskActionResponse::success(
                format!("Session already open with {} task(s).", session.board.len()),
                None,
            )
        } else {
            TaskActionResponse::failure(format!(
                "tasks_open failed: session already open at `{}`",
                session.db_path.display()
            ))
        };
    }

    let session = SESSION.get_or_init(|| Mutex::new(TaskSession::open(path)));
    let session = session.lock().unwrap_or_else(PoisonError::into_inner);
    TaskActionResponse::success(session.open_message(), None)
}

/// Adds a task; blank titles are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, description: String, due_epoch_ms: i64) -> TaskActionResponse {
    with_session(|session| session.add(&title, &description, due_epoch_ms))
}

/// Replaces title, description and due date of an existing task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(
    task_id: String,
    title: String,
    description: String,
    due_epoch_ms: i64,
) -> TaskActionResponse {
    with_session(|session| session.edit(&task_id, &title, &description, due_epoch_ms))
}

/// Flips a task's completion flag.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(task_id: String) -> TaskActionResponse {
    with_session(|session| session.toggle(&task_id))
}

/// Deletes a task (the UI owns the confirmation dialog).
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    with_session(|session| session.delete(&task_id))
}

/// Returns the grouped task list at the current local time.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_grouped() -> TaskListResponse {
    with_session(|session| session.grouped())
}

/// Drains alerts raised since the last call.
#[flutter_rust_bridge::frb(sync)]
pub fn take_overdue_alerts() -> Vec<OverdueAlertItem> {
    with_session(|session| session.take_alerts())
}

/// Blocks until queued writes have reached storage.
///
/// Call before the app is backgrounded; returns `false` when changes are
/// not being persisted.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_flush() -> bool {
    with_session(|session| session.flush())
}

/// Board, save queue and alert inbox for one storage location.
struct TaskSession {
    db_path: PathBuf,
    board: TaskBoard,
    alerts: AlertInbox,
    saves: Option<SaveQueue>,
    /// Set when changes cannot reach the database.
    storage_error: Option<String>,
}

impl TaskSession {
    fn open(db_path: PathBuf) -> Self {
        let (store, mut storage_error): (Box<dyn KeyValueStore + Send>, Option<String>) =
            match SqliteSlotStore::open(&db_path) {
                Ok(store) => (Box::new(store), None),
                Err(err) => {
                    error!(
                        "event=session_open module=ffi status=error error_code=db_open_failed error={err}"
                    );
                    (Box::new(MemorySlotStore::new()), Some(err.to_string()))
                }
            };

        let repository = TaskRepository::new(store);
        let alerts = AlertInbox::new();
        let mut board = TaskBoard::new(repository.load());
        let saves = match SaveQueue::spawn(repository) {
            Ok(queue) => {
                board.add_listener(queue.handle());
                Some(queue)
            }
            Err(err) => {
                error!(
                    "event=session_open module=ffi status=error error_code=save_queue_failed error={err}"
                );
                storage_error = Some(err.to_string());
                None
            }
        };
        board.attach_alerts(alerts.clone());
        board.notify_loaded();

        info!(
            "event=session_open module=ffi status=ok count={} persistent={}",
            board.len(),
            storage_error.is_none()
        );
        Self {
            db_path,
            board,
            alerts,
            saves,
            storage_error,
        }
    }

    fn open_message(&self) -> String {
        match &self.storage_error {
            None => format!("Loaded {} task(s).", self.board.len()),
            Some(reason) => format!(
                "Loaded {} task(s); changes will not persist: {reason}",
                self.board.len()
            ),
        }
    }

    fn add(&mut self, title: &str, description: &str, due_epoch_ms: i64) -> TaskActionResponse {
        let Some(due_date) = due_date_from_epoch_ms(due_epoch_ms) else {
            return TaskActionResponse::failure(format!(
                "task_add failed: due_epoch_ms out of range: {due_epoch_ms}"
            ));
        };
        match self.board.add(TaskDraft::new(title, description, due_date)) {
            Ok(id) => TaskActionResponse::success("Task created.", Some(id.to_string())),
            Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
        }
    }

    fn edit(
        &mut self,
        task_id: &str,
        title: &str,
        description: &str,
        due_epoch_ms: i64,
    ) -> TaskActionResponse {
        let id = match TaskId::parse(task_id) {
            Ok(id) => id,
            Err(err) => return TaskActionResponse::failure(format!("task_edit failed: {err}")),
        };
        let Some(due_date) = due_date_from_epoch_ms(due_epoch_ms) else {
            return TaskActionResponse::failure(format!(
                "task_edit failed: due_epoch_ms out of range: {due_epoch_ms}"
            ));
        };
        match self.board.edit(&id, TaskDraft::new(title, description, due_date)) {
            Ok(()) => TaskActionResponse::success("Task updated.", Some(id.to_string())),
            Err(err) => TaskActionResponse::failure(format!("task_edit failed: {err}")),
        }
    }

    fn toggle(&mut self, task_id: &str) -> TaskActionResponse {
        let result = TaskId::parse(task_id)
            .map_err(BoardError::from)
            .and_then(|id| self.board.toggle(&id).map(|completed| (id, completed)));
        match result {
            Ok((id, true)) => TaskActionResponse::success("Task completed.", Some(id.to_string())),
            Ok((id, false)) => TaskActionResponse::success("Task reopened.", Some(id.to_string())),
            Err(err) => TaskActionResponse::failure(format!("task_toggle failed: {err}")),
        }
    }

    fn delete(&mut self, task_id: &str) -> TaskActionResponse {
        let result = TaskId::parse(task_id)
            .map_err(BoardError::from)
            .and_then(|id| self.board.delete(&id));
        match result {
            Ok(task) => TaskActionResponse::success("Task deleted.", Some(task.id.to_string())),
            Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
        }
    }

    fn grouped(&self) -> TaskListResponse {
        let now = self.board.clock().now();
        let now_utc = now.with_timezone(&Utc);
        let sections = self
            .board
            .grouped_at(&now)
            .into_iter()
            .map(|group| to_section(group, now_utc))
            .collect::<Vec<_>>();
        let message = if sections.is_empty() {
            EMPTY_STATE_MESSAGE.to_string()
        } else {
            String::new()
        };
        TaskListResponse {
            sections,
            total: to_u32(self.board.len()),
            overdue_count: to_u32(self.board.overdue_count()),
            message,
        }
    }

    fn take_alerts(&self) -> Vec<OverdueAlertItem> {
        self.alerts.drain().into_iter().map(to_alert_item).collect()
    }

    fn flush(&self) -> bool {
        self.saves.as_ref().is_some_and(SaveQueue::flush)
    }
}

fn with_session<T>(f: impl FnOnce(&mut TaskSession) -> T) -> T {
    let session =
        SESSION.get_or_init(|| Mutex::new(TaskSession::open(resolve_db_path(None))));
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut session)
}

fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit.map(str::trim).filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn to_section(group: TaskGroup, now: chrono::DateTime<Utc>) -> TaskSection {
    TaskSection {
        kind: group_kind_label(group.key).to_string(),
        label: group.label,
        items: group
            .tasks
            .iter()
            .map(|task| to_task_item(task, now))
            .collect(),
    }
}

fn to_task_item(task: &Task, now: chrono::DateTime<Utc>) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        due_epoch_ms: task.due_epoch_ms(),
        due_time: format_due_time(task.due_date, &Local),
        overdue: is_overdue(task, now),
    }
}

fn to_alert_item(alert: OverdueAlert) -> OverdueAlertItem {
    OverdueAlertItem {
        title: OverdueAlert::TITLE.to_string(),
        message: alert.message(),
        count: to_u32(alert.count),
    }
}

fn group_kind_label(key: GroupKey) -> &'static str {
    match key {
        GroupKey::Overdue => "overdue",
        GroupKey::Today => "today",
        GroupKey::Tomorrow => "tomorrow",
        GroupKey::Day(_) => "day",
        GroupKey::Completed => "completed",
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
