//! Domain model for the note store.
//!
//! # Responsibility
//! - Define the note record and its input normalization rules.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard removal from the collection; there are no tombstones.

pub mod note;
