//! Flutter-facing bindings for Todum core.

pub mod api;
