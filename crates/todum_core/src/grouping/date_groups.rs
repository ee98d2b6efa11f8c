//! Date grouping engine.
//!
//! # Responsibility
//! - Partition a task collection into ordered, labeled display buckets.
//!
//! # Invariants
//! - Every input task lands in exactly one bucket.
//! - Bucket priority: Completed, Overdue, Today, Tomorrow, future day.
//! - Output order: Overdue, Today, Tomorrow, future days, Completed.
//! - Empty buckets are omitted; empty input yields empty output.
//! - Completed tasks sort by due date descending, every other bucket
//!   ascending. Sorting is stable.

use crate::grouping::labels::{
    format_day_label, local_due, COMPLETED_LABEL, OVERDUE_LABEL, TODAY_LABEL, TOMORROW_LABEL,
};
use crate::grouping::overdue::is_overdue;
use crate::model::task::Task;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Identity of one display bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Overdue,
    Today,
    Tomorrow,
    /// A calendar day after tomorrow.
    Day(NaiveDate),
    Completed,
}

impl GroupKey {
    /// Human-readable bucket header.
    pub fn label(&self) -> String {
        match self {
            Self::Overdue => OVERDUE_LABEL.to_string(),
            Self::Today => TODAY_LABEL.to_string(),
            Self::Tomorrow => TOMORROW_LABEL.to_string(),
            Self::Day(date) => format_day_label(*date),
            Self::Completed => COMPLETED_LABEL.to_string(),
        }
    }
}

/// Order of the future-day buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FutureDayOrder {
    /// Buckets appear in the order their first task appears in the input.
    #[default]
    FirstSeen,
    /// Buckets are sorted by calendar day.
    Chronological,
}

/// Tuning knobs for the grouping engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingOptions {
    pub future_day_order: FutureDayOrder,
}

/// One labeled bucket of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub key: GroupKey,
    pub label: String,
    pub tasks: Vec<Task>,
}

impl TaskGroup {
    fn new(key: GroupKey, tasks: Vec<Task>) -> Self {
        Self {
            label: key.label(),
            key,
            tasks,
        }
    }
}

/// Ordered mapping from bucket label to tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGroups {
    groups: Vec<TaskGroup>,
}

impl TaskGroups {
    pub fn iter(&self) -> std::slice::Iter<'_, TaskGroup> {
        self.groups.iter()
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finds a bucket by its display label.
    pub fn get(&self, label: &str) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.label == label)
    }

    /// Finds a bucket by key.
    pub fn get_key(&self, key: GroupKey) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.key == key)
    }

    /// Bucket labels in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.label.as_str()).collect()
    }

    /// Total number of tasks across all buckets.
    pub fn task_count(&self) -> usize {
        self.groups.iter().map(|group| group.tasks.len()).sum()
    }
}

impl<'a> IntoIterator for &'a TaskGroups {
    type Item = &'a TaskGroup;
    type IntoIter = std::slice::Iter<'a, TaskGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl IntoIterator for TaskGroups {
    type Item = TaskGroup;
    type IntoIter = std::vec::IntoIter<TaskGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Groups `tasks` at `now` with default options.
///
/// Calendar days are evaluated in `now`'s time zone.
pub fn group_tasks_by_date<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> TaskGroups {
    group_tasks_by_date_with(tasks, now, GroupingOptions::default())
}

/// Groups `tasks` at `now` with explicit options.
pub fn group_tasks_by_date_with<Tz: TimeZone>(
    tasks: &[Task],
    now: &DateTime<Tz>,
    options: GroupingOptions,
) -> TaskGroups {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(NaiveDate::MAX);

    let mut overdue = Vec::new();
    let mut due_today = Vec::new();
    let mut due_tomorrow = Vec::new();
    let mut future: Vec<(NaiveDate, Vec<Task>)> = Vec::new();
    let mut completed = Vec::new();

    for task in tasks {
        if task.completed {
            completed.push(task.clone());
            continue;
        }
        if is_overdue(task, now_utc) {
            overdue.push(task.clone());
            continue;
        }

        // Open tasks past the calendar range can only be far in the future.
        let day = local_due(task.due_date, &tz).map_or(NaiveDate::MAX, |local| local.date());
        if day <= today {
            // Earlier days only reach here inside the grace window.
            due_today.push(task.clone());
        } else if day == tomorrow {
            due_tomorrow.push(task.clone());
        } else {
            match future.iter_mut().find(|(bucket_day, _)| *bucket_day == day) {
                Some((_, bucket)) => bucket.push(task.clone()),
                None => future.push((day, vec![task.clone()])),
            }
        }
    }

    if options.future_day_order == FutureDayOrder::Chronological {
        future.sort_by_key(|(day, _)| *day);
    }

    let mut groups = Vec::with_capacity(4 + future.len());
    push_ascending(&mut groups, GroupKey::Overdue, overdue);
    push_ascending(&mut groups, GroupKey::Today, due_today);
    push_ascending(&mut groups, GroupKey::Tomorrow, due_tomorrow);
    for (day, bucket) in future {
        push_ascending(&mut groups, GroupKey::Day(day), bucket);
    }
    if !completed.is_empty() {
        completed.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        groups.push(TaskGroup::new(GroupKey::Completed, completed));
    }

    TaskGroups { groups }
}

fn push_ascending(groups: &mut Vec<TaskGroup>, key: GroupKey, mut tasks: Vec<Task>) {
    if tasks.is_empty() {
        return;
    }
    tasks.sort_by_key(|task| task.due_date);
    groups.push(TaskGroup::new(key, tasks));
}
