//! Note store: the in-memory collection and its persistence lifecycle.
//!
//! # Responsibility
//! - Own the ordered note collection as the single source of truth.
//! - Rewrite the full collection to the key-value layer after each mutation.
//!
//! # Invariants
//! - New notes are prepended; edits keep position.
//! - Loading never fails; unreadable data degrades to an empty collection.

pub mod note_store;
