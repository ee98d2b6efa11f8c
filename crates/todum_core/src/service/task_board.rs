//! Application state controller.
//!
//! # Responsibility
//! - Own the in-memory task collection and its mutation operations.
//! - Notify change listeners (persistence, alerts) after each mutation.
//! - Serve grouped and overdue views at the clock's current time.
//!
//! # Invariants
//! - Task IDs are unique within the board.
//! - Titles are trimmed and non-empty on add/edit; descriptions are trimmed
//!   on add and stored as typed on edit.
//! - Due dates stay within the storable range.
//! - Listeners run once per successful mutation, in registration order;
//!   rejected operations leave the collection untouched and notify nobody.

use crate::clock::{Clock, SystemClock};
use crate::grouping::date_groups::{group_tasks_by_date_with, GroupingOptions, TaskGroups};
use crate::grouping::overdue::count_overdue;
use crate::model::task::{
    normalize_title, validate_due_date, Task, TaskId, TaskValidationError,
};
use crate::service::overdue_notifier::{AlertPolicy, AlertSink, OverdueNotifier};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Observer of collection changes.
pub trait TaskChangeListener: Send {
    fn on_tasks_changed(&mut self, tasks: &[Task], now: DateTime<Utc>);
}

/// Board operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    Validation(TaskValidationError),
    NotFound(TaskId),
    DuplicateId(TaskId),
    /// `confirm_delete` was called without a pending request.
    NoPendingDelete,
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateId(id) => write!(f, "task id already exists: {id}"),
            Self::NoPendingDelete => write!(f, "no delete request is pending"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

/// User input for add and edit flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date,
        }
    }
}

/// Board behavior settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardOptions {
    pub grouping: GroupingOptions,
    pub alert_policy: AlertPolicy,
}

/// Owning controller for the task collection.
pub struct TaskBoard<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    clock: C,
    options: BoardOptions,
    listeners: Vec<Box<dyn TaskChangeListener>>,
    pending_delete: Option<TaskId>,
}

impl TaskBoard<SystemClock> {
    /// Builds a board over `tasks` using the local wall clock.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self::with_clock(tasks, SystemClock, BoardOptions::default())
    }
}

impl<C: Clock> TaskBoard<C> {
    /// Builds a board over a loaded collection.
    ///
    /// Later duplicates of an ID are dropped so the board starts consistent.
    pub fn with_clock(tasks: Vec<Task>, clock: C, options: BoardOptions) -> Self {
        let mut unique: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if unique.iter().any(|existing| existing.id == task.id) {
                warn!(
                    "event=board_init module=board status=warn reason=duplicate_id task_id={}",
                    task.id
                );
                continue;
            }
            unique.push(task);
        }

        Self {
            tasks: unique,
            clock,
            options,
            listeners: Vec::new(),
            pending_delete: None,
        }
    }

    /// Registers a change listener.
    pub fn add_listener(&mut self, listener: impl TaskChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Registers an overdue notifier using the board's alert policy.
    pub fn attach_alerts(&mut self, sink: impl AlertSink + 'static) {
        let policy = self.options.alert_policy;
        self.add_listener(OverdueNotifier::new(sink, policy));
    }

    /// Runs listeners once for the freshly loaded collection.
    pub fn notify_loaded(&mut self) {
        self.notify();
    }

    pub fn options(&self) -> BoardOptions {
        self.options
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Groups the collection at the clock's current time.
    pub fn grouped(&self) -> TaskGroups {
        self.grouped_at(&self.clock.now())
    }

    /// Groups the collection at a caller-sampled instant.
    pub fn grouped_at(&self, now: &DateTime<C::Tz>) -> TaskGroups {
        group_tasks_by_date_with(&self.tasks, now, self.options.grouping)
    }

    /// Number of overdue tasks right now.
    pub fn overdue_count(&self) -> usize {
        count_overdue(&self.tasks, self.now_utc())
    }

    /// Creates a task with a fresh ID.
    pub fn add(&mut self, draft: TaskDraft) -> BoardResult<TaskId> {
        self.add_with_id(TaskId::generate(), draft)
    }

    /// Creates a task with a caller-provided ID.
    pub fn add_with_id(&mut self, id: TaskId, draft: TaskDraft) -> BoardResult<TaskId> {
        let title = normalize_title(&draft.title)?;
        let due_date = validate_due_date(draft.due_date)?;
        if self.get(&id).is_some() {
            return Err(BoardError::DuplicateId(id));
        }

        let task = Task::with_id(id.clone(), title, draft.description.trim(), due_date);
        self.tasks.push(task);
        info!(
            "event=task_add module=board status=ok task_id={} count={}",
            id,
            self.tasks.len()
        );
        self.notify();
        Ok(id)
    }

    /// Replaces title, description and due date; keeps `completed`.
    ///
    /// The description is stored as given, without trimming.
    pub fn edit(&mut self, id: &TaskId, draft: TaskDraft) -> BoardResult<()> {
        let title = normalize_title(&draft.title)?;
        let due_date = validate_due_date(draft.due_date)?;
        let task = self.find_mut(id)?;
        let completed = task.completed;
        *task = Task::with_id(id.clone(), title, draft.description, due_date)
            .completed(completed);
        info!("event=task_edit module=board status=ok task_id={id}");
        self.notify();
        Ok(())
    }

    /// Flips completion and returns the new state.
    pub fn toggle(&mut self, id: &TaskId) -> BoardResult<bool> {
        let completed = self.find_mut(id)?.toggle();
        info!("event=task_toggle module=board status=ok task_id={id} completed={completed}");
        self.notify();
        Ok(completed)
    }

    /// Removes a task immediately.
    pub fn delete(&mut self, id: &TaskId) -> BoardResult<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;
        let removed = self.tasks.remove(index);
        if self.pending_delete.as_ref() == Some(id) {
            self.pending_delete = None;
        }
        info!(
            "event=task_delete module=board status=ok task_id={id} count={}",
            self.tasks.len()
        );
        self.notify();
        Ok(removed)
    }

    /// Marks a task for deletion pending confirmation.
    ///
    /// A newer request replaces an older one.
    pub fn request_delete(&mut self, id: &TaskId) -> BoardResult<()> {
        if self.get(id).is_none() {
            return Err(BoardError::NotFound(id.clone()));
        }
        self.pending_delete = Some(id.clone());
        Ok(())
    }

    /// Deletes the task marked by `request_delete`.
    pub fn confirm_delete(&mut self) -> BoardResult<Task> {
        let id = self
            .pending_delete
            .take()
            .ok_or(BoardError::NoPendingDelete)?;
        self.delete(&id)
    }

    /// Drops the pending delete request, returning its ID.
    pub fn cancel_delete(&mut self) -> Option<TaskId> {
        self.pending_delete.take()
    }

    pub fn pending_delete(&self) -> Option<&TaskId> {
        self.pending_delete.as_ref()
    }

    fn find_mut(&mut self, id: &TaskId) -> BoardResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn notify(&mut self) {
        let now = self.now_utc();
        for listener in self.listeners.iter_mut() {
            listener.on_tasks_changed(&self.tasks, now);
        }
    }
}
