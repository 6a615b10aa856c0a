//! Flutter-facing bindings for ZenNote core.

pub mod api;
