//! Core domain logic for Todum.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod db;
pub mod grouping;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use grouping::date_groups::{
    group_tasks_by_date, group_tasks_by_date_with, FutureDayOrder, GroupKey, GroupingOptions,
    TaskGroup, TaskGroups,
};
pub use grouping::labels::{format_day_label, format_due_time};
pub use grouping::overdue::{count_overdue, is_overdue, OVERDUE_GRACE_MS};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use repo::task_repo::{RepoError, RepoResult, TaskRepository, TASKS_STORAGE_KEY};
pub use service::overdue_notifier::{
    AlertInbox, AlertPolicy, AlertSink, OverdueAlert, OverdueNotifier,
};
pub use service::save_queue::{SaveHandle, SaveQueue};
pub use service::task_board::{
    BoardError, BoardOptions, BoardResult, TaskBoard, TaskChangeListener, TaskDraft,
};
pub use store::{KeyValueStore, MemorySlotStore, SqliteSlotStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
