//! Flutter-facing bindings for note copy.

pub mod api;
