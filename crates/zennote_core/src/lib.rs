//! Core domain logic for ZenNote.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod render;
pub mod settings;
pub mod store;

pub use config::{StoreConfig, DEFAULT_NOTES_KEY, DEFAULT_THEME_KEY};
pub use db::{DbError, DbResult};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError, UNTITLED};
pub use render::dates::{format_card_date, format_detail_date};
pub use render::html::{escape_html, format_detail, format_summary, SUMMARY_MAX_CHARS};
pub use render::view::{note_detail, notes_view, EmptyState, NoteCard, NoteDetail, NotesView};
pub use settings::{load_theme, save_theme, ThemePreference};
pub use store::note_store::{Clock, NoteStore, PersistenceError, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
