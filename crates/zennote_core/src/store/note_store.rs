//! Note store use-cases.
//!
//! # Responsibility
//! - Provide create/update/delete/list/get over the note collection.
//! - Persist the whole collection as one JSON array under `notes_key`.
//! - Report persistence failures without discarding in-memory edits.
//!
//! # Invariants
//! - Ids are unique across the collection.
//! - `title` is never stored empty.
//! - `delete` of an unknown id is a silent no-op.
//! - `is_dirty()` is `true` exactly when the last persist attempt failed.
//! - After a load whose read failed, mutations are not written until an
//!   explicit `save()` succeeds.
//!
//! Several stores over one backend are last-write-wins; nothing coordinates
//! them.

use crate::config::StoreConfig;
use crate::kv::{KeyValueStore, KvError};
use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::settings::{load_theme, save_theme, ThemePreference};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Source of "now" for ids and timestamps.
pub type Clock = fn() -> DateTime<Utc>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for note store use-cases.
#[derive(Debug)]
pub enum StoreError {
    /// Title and content were both blank.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NotFound(NoteId),
    /// The mutation was applied in memory but could not be saved.
    Persistence(PersistenceError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Persistence(err) => write!(
                f,
                "{err}; changes are kept in memory but not saved to storage"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Failure writing the collection or settings to storage.
#[derive(Debug)]
pub enum PersistenceError {
    Serialize(serde_json::Error),
    Storage(KvError),
    /// The stored collection could not be read at load time, so writing the
    /// in-memory one would replace notes this store never saw.
    UnreadCollection,
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize notes: {err}"),
            Self::Storage(err) => write!(f, "failed to write storage: {err}"),
            Self::UnreadCollection => write!(
                f,
                "stored notes could not be read at load; refusing to overwrite them"
            ),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::UnreadCollection => None,
        }
    }
}

/// Ordered note collection synchronized to a key-value backend.
pub struct NoteStore<S: KeyValueStore> {
    backend: S,
    config: StoreConfig,
    notes: Vec<Note>,
    dirty: bool,
    load_degraded: bool,
    clock: Clock,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Loads the collection stored under the default keys.
    pub fn load(backend: S) -> Self {
        Self::load_with_config(backend, StoreConfig::default())
    }

    /// Loads the collection stored under `config.notes_key`.
    ///
    /// Absent, unreadable, or malformed data yields an empty store. When the
    /// read itself fails the store is marked degraded: see
    /// [`NoteStore::is_load_degraded`].
    pub fn load_with_config(backend: S, config: StoreConfig) -> Self {
        let (notes, load_degraded) = match read_notes(&backend, &config.notes_key) {
            Ok(notes) => {
                info!(
                    "event=notes_load module=store status=ok note_count={}",
                    notes.len()
                );
                (notes, false)
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=store status=degraded reason=read_failed error={err}"
                );
                (Vec::new(), true)
            }
        };
        Self {
            backend,
            config,
            notes,
            dirty: false,
            load_degraded,
            clock: Utc::now,
        }
    }

    /// Replaces the time source used for ids and timestamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a note and prepends it to the collection.
    ///
    /// # Errors
    /// - `StoreError::Validation` when title and content are both blank;
    ///   the collection is unchanged.
    /// - `StoreError::Persistence` when saving fails; the note stays in memory.
    pub fn create(&mut self, title: &str, content: &str) -> StoreResult<Note> {
        let draft = NoteDraft::new(title, content).inspect_err(|_| {
            warn!("event=note_create module=store status=rejected reason=empty_note");
        })?;

        let now = (self.clock)();
        let note = Note::from_draft(self.next_id(now), draft, now);
        self.notes.insert(0, note.clone());
        self.persist_after("note_create", &note.id)?;
        Ok(note)
    }

    /// Replaces title/content of one note and refreshes its timestamp.
    ///
    /// Position and id are preserved.
    ///
    /// # Errors
    /// - `StoreError::Validation` when title and content are both blank.
    /// - `StoreError::NotFound` when `id` is unknown.
    /// - `StoreError::Persistence` when saving fails; the edit stays in memory.
    pub fn update(&mut self, id: &str, title: &str, content: &str) -> StoreResult<Note> {
        let draft = NoteDraft::new(title, content).inspect_err(|_| {
            warn!("event=note_update module=store status=rejected reason=empty_note note_id={id}");
        })?;

        let now = (self.clock)();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            warn!("event=note_update module=store status=rejected reason=not_found note_id={id}");
            return Err(StoreError::NotFound(id.to_string()));
        };
        note.apply_draft(draft, now);
        let updated = note.clone();

        self.persist_after("note_update", id)?;
        Ok(updated)
    }

    /// Removes one note. Unknown ids are ignored.
    ///
    /// Returns whether a note was removed.
    ///
    /// # Errors
    /// - `StoreError::Persistence` when saving fails; the removal stays in memory.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let Some(index) = self.notes.iter().position(|note| note.id == id) else {
            info!("event=note_delete module=store status=noop note_id={id}");
            return Ok(false);
        };

        self.notes.remove(index);
        self.persist_after("note_delete", id)?;
        Ok(true)
    }

    /// Lazily yields notes matching `filter`, in stored order.
    ///
    /// `None` and `Some("")` yield every note.
    pub fn iter<'a>(&'a self, filter: Option<&str>) -> impl Iterator<Item = &'a Note> + 'a {
        let needle = filter
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);
        self.notes
            .iter()
            .filter(move |note| needle.as_deref().map_or(true, |needle| note.matches(needle)))
    }

    /// Materialized form of [`NoteStore::iter`].
    pub fn list(&self, filter: Option<&str>) -> Vec<Note> {
        self.iter(filter).cloned().collect()
    }

    /// Point lookup by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Rewrites the full collection, e.g. to retry after a persistence error.
    ///
    /// This is the only write allowed after a degraded load; on success the
    /// in-memory collection replaces whatever storage held and the store
    /// leaves the degraded state.
    pub fn save(&mut self) -> StoreResult<()> {
        self.write_through("notes_save", "-")?;
        self.load_degraded = false;
        Ok(())
    }

    /// Whether in-memory notes differ from what storage last accepted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the stored collection failed to read at load time.
    ///
    /// While set, create/update/delete apply in memory only and return
    /// `PersistenceError::UnreadCollection`.
    pub fn is_load_degraded(&self) -> bool {
        self.load_degraded
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Reads the theme preference from the same backend.
    pub fn theme(&self) -> ThemePreference {
        load_theme(&self.backend, &self.config)
    }

    /// Persists the theme preference to the same backend.
    pub fn set_theme(&mut self, theme: ThemePreference) -> StoreResult<()> {
        save_theme(&mut self.backend, &self.config, theme)
            .map_err(|err| PersistenceError::Storage(err).into())
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn next_id(&self, now: DateTime<Utc>) -> NoteId {
        let mut millis = now.timestamp_millis();
        loop {
            let candidate = millis.to_string();
            if self.get(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }

    fn persist_after(&mut self, event: &'static str, note_id: &str) -> StoreResult<()> {
        if self.load_degraded {
            self.dirty = true;
            error!(
                "event={event} module=store status=error error_code=unread_collection note_id={note_id} note_count={}",
                self.notes.len()
            );
            return Err(PersistenceError::UnreadCollection.into());
        }
        self.write_through(event, note_id)
    }

    fn write_through(&mut self, event: &'static str, note_id: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        self.dirty = true;
        match self.write_notes() {
            Ok(bytes) => {
                self.dirty = false;
                info!(
                    "event={event} module=store status=ok note_id={note_id} note_count={} bytes={bytes} duration_ms={}",
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=store status=error error_code=persist_failed note_id={note_id} note_count={} duration_ms={} error={err}",
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    fn write_notes(&mut self) -> Result<usize, PersistenceError> {
        let payload = serde_json::to_string(&self.notes).map_err(PersistenceError::Serialize)?;
        self.backend
            .set(&self.config.notes_key, &payload)
            .map_err(PersistenceError::Storage)?;
        Ok(payload.len())
    }
}

/// Reads and decodes the stored collection.
///
/// Only a failed read is an error; absent or malformed data decodes as empty.
fn read_notes<S: KeyValueStore>(backend: &S, key: &str) -> Result<Vec<Note>, KvError> {
    let Some(raw) = backend.get(key)? else {
        return Ok(Vec::new());
    };

    // `null` is what an uninitialized browser key parses to.
    let mut notes = match serde_json::from_str::<Option<Vec<Note>>>(&raw) {
        Ok(notes) => notes.unwrap_or_default(),
        Err(err) => {
            // Error text can echo stored values; log the category only.
            warn!(
                "event=notes_load module=store status=degraded reason=malformed_json category={:?} line={} column={}",
                err.classify(),
                err.line(),
                err.column()
            );
            return Ok(Vec::new());
        }
    };

    let before = notes.len();
    let mut seen = HashSet::new();
    notes.retain(|note| seen.insert(note.id.clone()));
    if notes.len() != before {
        warn!(
            "event=notes_load module=store status=degraded reason=duplicate_ids dropped={}",
            before - notes.len()
        );
    }
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::kv::MemoryKvStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn frozen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn ids_created_in_same_millisecond_are_distinct() {
        let mut store = NoteStore::load(MemoryKvStore::new()).with_clock(frozen);
        let first = store.create("a", "").unwrap();
        let second = store.create("b", "").unwrap();
        let third = store.create("c", "").unwrap();

        assert_eq!(first.id, frozen().timestamp_millis().to_string());
        assert_eq!(second.id, (frozen().timestamp_millis() + 1).to_string());
        assert_eq!(third.id, (frozen().timestamp_millis() + 2).to_string());
    }

    #[test]
    fn create_stamps_frozen_clock_time() {
        let mut store = NoteStore::load(MemoryKvStore::new()).with_clock(frozen);
        let note = store.create("title", "body").unwrap();
        assert_eq!(note.date, "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn load_drops_duplicate_ids_keeping_first() {
        let mut backend = MemoryKvStore::new();
        crate::kv::KeyValueStore::set(
            &mut backend,
            "zenNotes",
            r#"[{"id":"1","title":"a","content":"","date":"x"},
                {"id":"1","title":"b","content":"","date":"y"}]"#,
        )
        .unwrap();

        let store = NoteStore::load(backend);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().title, "a");
    }

    #[test]
    fn load_treats_json_null_as_empty() {
        let mut backend = MemoryKvStore::new();
        crate::kv::KeyValueStore::set(&mut backend, "zenNotes", "null").unwrap();
        assert!(NoteStore::load(backend).is_empty());
    }
}
