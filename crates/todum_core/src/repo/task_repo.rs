//! Task collection persistence adapter.
//!
//! # Responsibility
//! - Encode the full task list as a JSON array into a single named slot.
//! - Decode it back, rebuilding `due_date` as a real timestamp.
//!
//! # Invariants
//! - Absent or blank slot loads as an empty collection.
//! - Malformed blobs and store failures never reach the caller of
//!   `load`/`save`; they are logged and degrade to "empty" / "not saved".
//! - Loaded collections contain at most one task per ID (first one wins).

use crate::model::task::{Task, TaskId};
use crate::store::{KeyValueStore, StoreError};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Slot key holding the serialized task collection.
pub const TASKS_STORAGE_KEY: &str = "@TodumApp:tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// The stored blob is not a valid task list.
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "invalid persisted task data: {err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Loads and saves the task collection through a key-value slot.
pub struct TaskRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Uses the default `TASKS_STORAGE_KEY` slot.
    pub fn new(store: S) -> Self {
        Self::with_key(store, TASKS_STORAGE_KEY)
    }

    /// Uses a caller-chosen slot key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the collection, degrading every failure to an empty list.
    pub fn load(&self) -> Vec<Task> {
        let started_at = Instant::now();
        match self.try_load() {
            Ok(tasks) => {
                info!(
                    "event=tasks_load module=repo status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                tasks
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=repo status=error error_code={} error={}",
                    error_code(&err),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Saves the collection; failures are logged and swallowed.
    ///
    /// Returns whether the write landed, for callers that track it.
    pub fn save(&self, tasks: &[Task]) -> bool {
        let started_at = Instant::now();
        match self.try_save(tasks) {
            Ok(()) => {
                info!(
                    "event=tasks_save module=repo status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=tasks_save module=repo status=error error_code={} error={}",
                    error_code(&err),
                    err
                );
                false
            }
        }
    }

    /// Loads the collection, returning decode and store errors.
    pub fn try_load(&self) -> RepoResult<Vec<Task>> {
        match self.store.get(&self.key)? {
            Some(blob) => decode_tasks(&blob),
            None => Ok(Vec::new()),
        }
    }

    /// Saves the collection, returning encode and store errors.
    pub fn try_save(&self, tasks: &[Task]) -> RepoResult<()> {
        let blob = encode_tasks(tasks)?;
        self.store.set(&self.key, &blob)?;
        Ok(())
    }
}

/// Serializes a task list into the stored blob format.
pub fn encode_tasks(tasks: &[Task]) -> RepoResult<String> {
    serde_json::to_string(tasks).map_err(RepoError::Encode)
}

/// Parses a stored blob into tasks, dropping duplicate IDs.
pub fn decode_tasks(blob: &str) -> RepoResult<Vec<Task>> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }

    let decoded: Vec<Task> = serde_json::from_str(blob).map_err(RepoError::Decode)?;
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(decoded.len());
    let mut tasks = Vec::with_capacity(decoded.len());
    for task in decoded {
        if seen.insert(task.id.clone()) {
            tasks.push(task);
        } else {
            warn!(
                "event=tasks_load module=repo status=warn reason=duplicate_id task_id={}",
                task.id
            );
        }
    }
    Ok(tasks)
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Store(_) => "store_failed",
        RepoError::Decode(_) => "decode_failed",
        RepoError::Encode(_) => "encode_failed",
    }
}
