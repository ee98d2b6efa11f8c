//! Application services around the task collection.
//!
//! # Responsibility
//! - Own and mutate the in-memory collection (`task_board`).
//! - React to changes: ordered persistence (`save_queue`) and overdue alerts
//!   (`overdue_notifier`).

pub mod overdue_notifier;
pub mod save_queue;
pub mod task_board;
