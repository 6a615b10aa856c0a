//! Store configuration.
//!
//! # Invariants
//! - Defaults match the keys written by earlier builds (`zenNotes`, `theme`),
//!   so existing collections load without migration.

/// Key holding the JSON array of notes.
pub const DEFAULT_NOTES_KEY: &str = "zenNotes";
/// Key holding the theme preference.
pub const DEFAULT_THEME_KEY: &str = "theme";

/// Storage key layout used by `NoteStore` and theme settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub notes_key: String,
    pub theme_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notes_key: DEFAULT_NOTES_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Namespaces both keys, e.g. for isolated profiles sharing one database.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Self::default();
        }
        Self {
            notes_key: format!("{prefix}.{DEFAULT_NOTES_KEY}"),
            theme_key: format!("{prefix}.{DEFAULT_THEME_KEY}"),
        }
    }
}
