//! Presentation formatting.
//!
//! # Responsibility
//! - Turn note records into escaped markup and display labels.
//! - Stay free of side effects so any UI adapter can call it directly.
//!
//! # Invariants
//! - Every function here is pure and deterministic for its inputs.

pub mod dates;
pub mod html;
pub mod view;
