//! Display labels for groups and due times.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

pub const OVERDUE_LABEL: &str = "Overdue";
pub const TODAY_LABEL: &str = "Today";
pub const TOMORROW_LABEL: &str = "Tomorrow";
pub const COMPLETED_LABEL: &str = "Completed";

/// Formats a calendar day as `"Monday, Jan 5"`.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// Wall-clock time of `due` in `tz`.
///
/// Returns `None` when the shifted value leaves chrono's calendar range.
pub fn local_due<Tz: TimeZone>(due: DateTime<Utc>, tz: &Tz) -> Option<NaiveDateTime> {
    let utc = due.naive_utc();
    utc.checked_add_offset(tz.offset_from_utc_datetime(&utc).fix())
}

/// Formats the wall-clock time of `due` in `tz` as `"HH:MM"`.
///
/// Falls back to UTC when the local value is unrepresentable.
pub fn format_due_time<Tz: TimeZone>(due: DateTime<Utc>, tz: &Tz) -> String {
    local_due(due, tz)
        .unwrap_or_else(|| due.naive_utc())
        .format("%H:%M")
        .to_string()
}
