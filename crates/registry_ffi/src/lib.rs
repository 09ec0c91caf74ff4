//! Flutter-facing bindings for the registry core.

pub mod api;
