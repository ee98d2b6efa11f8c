//! Overdue classification.
//!
//! # Invariants
//! - Completed tasks are never overdue.
//! - An open task becomes overdue strictly after `due_date + OVERDUE_GRACE_MS`.

use crate::model::task::Task;
use chrono::{DateTime, TimeDelta, Utc};

/// Grace period after the due instant before a task counts as late.
pub const OVERDUE_GRACE_MS: i64 = 300_000;

/// Grace period as a duration.
pub fn overdue_grace() -> TimeDelta {
    TimeDelta::milliseconds(OVERDUE_GRACE_MS)
}

/// Returns whether `task` is late at `now`.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    if task.completed {
        return false;
    }
    now.signed_duration_since(task.due_date) > overdue_grace()
}

/// Counts overdue tasks in `tasks` at `now`.
pub fn count_overdue(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|task| is_overdue(task, now)).count()
}
