//! Domain model for tracked tasks.
//!
//! # Responsibility
//! - Define the canonical task record used by grouping, storage and the board.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard removal from the collection; there are no tombstones.

pub mod task;
