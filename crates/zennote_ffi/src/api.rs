//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/create/update/delete/get and theme calls to Dart via FRB.
//! - Map core errors to stable `error_code` strings for UI messaging.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens the durable store, loads, runs one command and saves.
//! - A call never runs against a collection that failed to read.
//! - Calls are serialized in-process so concurrent callers cannot drop
//!   each other's writes.

use chrono::Local;
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use zennote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, note_detail,
    notes_view, ping as ping_inner, Note, NoteStore, SqliteKvStore, StoreError, ThemePreference,
};

const DB_FILE_NAME: &str = "zennote.sqlite3";
const DB_PATH_ENV: &str = "ZENNOTE_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Plain note record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// ISO-8601 timestamp as stored.
    pub date: String,
}

/// Rendered list card. HTML fields are already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCardItem {
    pub id: String,
    pub title_html: String,
    pub date_label: String,
    pub summary_html: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// `persistence|storage_open`, `None` on success.
    pub error_code: Option<String>,
    pub items: Vec<NoteCardItem>,
    /// Empty-state heading, set when `items` is empty.
    pub empty_heading: Option<String>,
    /// Empty-state hint, set when `items` is empty.
    pub empty_hint: Option<String>,
    pub message: String,
}

/// Rendered detail view. HTML fields are already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetailItem {
    pub id: String,
    pub title_html: String,
    pub date_label: String,
    pub body_html: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// `validation|not_found|persistence|storage_open`, `None` on success.
    pub error_code: Option<String>,
    pub note: Option<NoteItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            error_code: None,
            note,
            message: message.into(),
        }
    }

    fn failure(failure: CallFailure) -> Self {
        Self {
            ok: false,
            error_code: Some(failure.code.to_string()),
            note: None,
            message: failure.message,
        }
    }
}

/// Detail response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetailResponse {
    pub ok: bool,
    pub error_code: Option<String>,
    pub detail: Option<NoteDetailItem>,
    pub message: String,
}

/// Theme response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeResponse {
    pub ok: bool,
    /// `validation|persistence|storage_open`, `None` on success.
    pub error_code: Option<String>,
    /// `light|dark` after the call; `None` when it failed.
    pub theme: Option<String>,
    pub message: String,
}

impl ThemeResponse {
    fn success(message: impl Into<String>, theme: ThemePreference) -> Self {
        Self {
            ok: true,
            error_code: None,
            theme: Some(theme.as_str().to_string()),
            message: message.into(),
        }
    }

    fn failure(failure: CallFailure) -> Self {
        Self {
            ok: false,
            error_code: Some(failure.code.to_string()),
            theme: None,
            message: failure.message,
        }
    }
}

/// Lists notes as rendered cards, newest first.
///
/// `filter` is a case-insensitive substring over title and content; empty
/// returns everything.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(filter: String) -> NotesListResponse {
    let result = with_store(|store| {
        let view = notes_view(store, Some(filter.as_str()), &Local::now());
        Ok(view)
    });

    match result {
        Ok(view) => {
            let items = view
                .cards
                .into_iter()
                .map(|card| NoteCardItem {
                    id: card.id,
                    title_html: card.title_html,
                    date_label: card.date_label,
                    summary_html: card.summary_html,
                })
                .collect::<Vec<_>>();
            let message = format!("Found {} note(s).", items.len());
            NotesListResponse {
                ok: true,
                error_code: None,
                items,
                empty_heading: view.empty_state.map(|state| state.heading().to_string()),
                empty_hint: view.empty_state.map(|state| state.hint().to_string()),
                message,
            }
        }
        Err(failure) => {
            let failure = failure.context("notes_list");
            NotesListResponse {
                ok: false,
                error_code: Some(failure.code.to_string()),
                items: Vec::new(),
                empty_heading: None,
                empty_hint: None,
                message: failure.message,
            }
        }
    }
}

/// Creates a note. Blank title becomes `Untitled`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String) -> NoteActionResponse {
    match with_store(|store| store.create(&title, &content).map_err(CallFailure::from)) {
        Ok(note) => NoteActionResponse::success("Note saved.", Some(to_note_item(note))),
        Err(failure) => NoteActionResponse::failure(failure.context("note_create")),
    }
}

/// Replaces title/content of an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String) -> NoteActionResponse {
    match with_store(|store| {
        store
            .update(&id, &title, &content)
            .map_err(CallFailure::from)
    }) {
        Ok(note) => NoteActionResponse::success("Note updated.", Some(to_note_item(note))),
        Err(failure) => NoteActionResponse::failure(failure.context("note_update")),
    }
}

/// Deletes a note. Unknown ids succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    match with_store(|store| store.delete(&id).map_err(CallFailure::from)) {
        Ok(true) => NoteActionResponse::success("Note deleted successfully", None),
        Ok(false) => NoteActionResponse::success("Note already deleted.", None),
        Err(failure) => NoteActionResponse::failure(failure.context("note_delete")),
    }
}

/// Gets one raw note, e.g. to prefill the edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: String) -> NoteActionResponse {
    match with_store(|store| {
        store
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()).into())
    }) {
        Ok(note) => NoteActionResponse::success("Note found.", Some(to_note_item(note))),
        Err(failure) => NoteActionResponse::failure(failure.context("note_get")),
    }
}

/// Renders one note for the detail view.
#[flutter_rust_bridge::frb(sync)]
pub fn note_detail_view(id: String) -> NoteDetailResponse {
    let result = with_store(|store| match store.get(&id) {
        Some(note) => Ok(note_detail(note, &Local)),
        None => Err(StoreError::NotFound(id.clone()).into()),
    });

    match result {
        Ok(detail) => NoteDetailResponse {
            ok: true,
            error_code: None,
            detail: Some(NoteDetailItem {
                id: detail.id,
                title_html: detail.title_html,
                date_label: detail.date_label,
                body_html: detail.body_html,
            }),
            message: "Note found.".to_string(),
        },
        Err(failure) => {
            let failure = failure.context("note_detail_view");
            NoteDetailResponse {
                ok: false,
                error_code: Some(failure.code.to_string()),
                detail: None,
                message: failure.message,
            }
        }
    }
}

/// Returns the stored theme, `light` when unset or unrecognized.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_get() -> ThemeResponse {
    match with_store(|store| Ok(store.theme())) {
        Ok(theme) => ThemeResponse::success("Theme loaded.", theme),
        Err(failure) => ThemeResponse::failure(failure.context("theme_get")),
    }
}

/// Stores `theme` (`light|dark`).
#[flutter_rust_bridge::frb(sync)]
pub fn theme_set(theme: String) -> ThemeResponse {
    let Some(parsed) = ThemePreference::parse(&theme) else {
        return ThemeResponse::failure(CallFailure {
            code: "validation",
            message: format!("theme_set failed: unsupported theme `{theme}`; expected light|dark"),
        });
    };
    match with_store(|store| store.set_theme(parsed).map_err(CallFailure::from)) {
        Ok(()) => ThemeResponse::success("Theme saved.", parsed),
        Err(failure) => ThemeResponse::failure(failure.context("theme_set")),
    }
}

/// Flips the stored theme and returns the new value.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_toggle() -> ThemeResponse {
    let result = with_store(|store| {
        let next = store.theme().toggled();
        store.set_theme(next).map_err(CallFailure::from)?;
        Ok(next)
    });
    match result {
        Ok(theme) => ThemeResponse::success("Theme saved.", theme),
        Err(failure) => {
            let failure = failure.context("theme_toggle");
            warn!(
                "event=theme_toggle module=ffi status=error error_code={} error={}",
                failure.code, failure.message
            );
            ThemeResponse::failure(failure)
        }
    }
}

#[derive(Debug)]
struct CallFailure {
    code: &'static str,
    message: String,
}

impl CallFailure {
    fn context(self, call: &str) -> Self {
        Self {
            code: self.code,
            message: format!("{call} failed: {}", self.message),
        }
    }
}

impl From<StoreError> for CallFailure {
    fn from(value: StoreError) -> Self {
        let code = match &value {
            StoreError::Validation(_) => "validation",
            StoreError::NotFound(_) => "not_found",
            StoreError::Persistence(_) => "persistence",
        };
        Self {
            code,
            message: value.to_string(),
        }
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&mut NoteStore<SqliteKvStore>) -> Result<T, CallFailure>,
) -> Result<T, CallFailure> {
    let _guard = STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let backend = SqliteKvStore::open(resolve_db_path()).map_err(|err| CallFailure {
        code: "storage_open",
        message: format!("note storage open failed: {err}"),
    })?;
    let mut store = NoteStore::load(backend);
    // An empty view of an unreadable collection must not reach the UI or be
    // written back over it.
    if store.is_load_degraded() {
        return Err(CallFailure {
            code: "storage_open",
            message: "stored notes could not be read".to_string(),
        });
    }
    f(&mut store)
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id,
        title: note.title,
        content: note.content,
        date: note.date,
    }
}
