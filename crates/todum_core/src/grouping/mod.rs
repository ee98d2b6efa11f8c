//! Overdue classification and date grouping.
//!
//! # Responsibility
//! - Decide which tasks are late.
//! - Partition tasks into display buckets by temporal proximity.
//!
//! # Invariants
//! - Both are pure functions of `(tasks, now)`; no wall-clock reads here.

pub mod date_groups;
pub mod labels;
pub mod overdue;
