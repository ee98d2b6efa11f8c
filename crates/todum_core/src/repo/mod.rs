//! Persistence adapters over the durable slot store.
//!
//! # Responsibility
//! - Translate the in-memory task collection to and from one stored blob.
//! - Keep encoding details out of the board and UI layers.
//!
//! # Invariants
//! - Persistence is whole-collection replace-on-write.
//! - `load`/`save` degrade to logged failures instead of returning errors.

pub mod task_repo;
