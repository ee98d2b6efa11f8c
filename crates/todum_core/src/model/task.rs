//! Task domain model.
//!
//! # Responsibility
//! - Define the single record type tracked by the app.
//! - Own the persisted wire shape (camelCase keys, RFC 3339 `dueDate`).
//!
//! # Invariants
//! - `id` is stable for the task lifetime and unique within a collection.
//! - `due_date` carries millisecond precision so storage round-trips exactly.
//! - A completed task is never overdue, regardless of `due_date`.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Fresh IDs are UUID v4 text, but any non-empty string is accepted so that
/// collections written by earlier builds (epoch-ms IDs) keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh unique ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing ID, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> Result<Self, TaskValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Identifier is empty after trimming whitespace.
    EmptyId,
    /// Due date lies outside years 0000..=9999.
    DueDateOutOfRange,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::DueDateOutOfRange => write!(f, "task due date is out of range"),
        }
    }
}

impl Error for TaskValidationError {}

/// A user-created to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Due point in time (date + time), used for ordering and grouping.
    #[serde(with = "due_date_format")]
    pub due_date: DateTime<Utc>,
}

impl Task {
    /// Creates an open task with a generated ID.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self::with_id(TaskId::generate(), title, description, due_date)
    }

    /// Creates an open task with a caller-provided ID.
    ///
    /// Does not validate the title; add/edit flows own that check.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            completed: false,
            due_date: truncate_to_millis(due_date),
        }
    }

    /// Returns a copy with `completed` set.
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Due date as Unix epoch milliseconds.
    pub fn due_epoch_ms(&self) -> i64 {
        self.due_date.timestamp_millis()
    }
}

/// Drops sub-millisecond precision from a timestamp.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Earliest storable due date, `0000-01-01T00:00:00.000Z`.
pub const MIN_DUE_EPOCH_MS: i64 = -62_167_219_200_000;
/// Latest storable due date, `9999-12-31T23:59:59.999Z`.
pub const MAX_DUE_EPOCH_MS: i64 = 253_402_300_799_999;

/// Converts Unix epoch milliseconds into a UTC timestamp.
///
/// Returns `None` outside `MIN_DUE_EPOCH_MS..=MAX_DUE_EPOCH_MS`.
pub fn due_date_from_epoch_ms(epoch_ms: i64) -> Option<DateTime<Utc>> {
    if !(MIN_DUE_EPOCH_MS..=MAX_DUE_EPOCH_MS).contains(&epoch_ms) {
        return None;
    }
    Utc.timestamp_millis_opt(epoch_ms).single()
}

/// Rejects due dates the blob format cannot round-trip (four-digit years).
pub fn validate_due_date(due_date: DateTime<Utc>) -> Result<DateTime<Utc>, TaskValidationError> {
    let truncated = truncate_to_millis(due_date);
    if (MIN_DUE_EPOCH_MS..=MAX_DUE_EPOCH_MS).contains(&truncated.timestamp_millis()) {
        Ok(truncated)
    } else {
        Err(TaskValidationError::DueDateOutOfRange)
    }
}

/// Trims a title and rejects it when nothing is left.
pub fn normalize_title(title: &str) -> Result<String, TaskValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// `dueDate` is written as `YYYY-MM-DDTHH:MM:SS.mmmZ`; on read an RFC 3339
/// string or an integer epoch-ms value is accepted, limited to four-digit
/// years.
mod due_date_format {
    use super::{due_date_from_epoch_ms, validate_due_date};
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt::Formatter;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DueDateVisitor)
    }

    struct DueDateVisitor;

    impl Visitor<'_> for DueDateVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("an RFC 3339 timestamp string or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let parsed = DateTime::parse_from_rfc3339(value.trim())
                .map_err(|err| E::custom(format!("invalid dueDate `{value}`: {err}")))?;
            validate_due_date(parsed.with_timezone(&Utc))
                .map_err(|err| E::custom(format!("invalid dueDate `{value}`: {err}")))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            due_date_from_epoch_ms(value)
                .ok_or_else(|| E::custom(format!("dueDate out of range: {value}")))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            let value = i64::try_from(value)
                .map_err(|_| E::custom(format!("dueDate out of range: {value}")))?;
            self.visit_i64(value)
        }
    }
}
