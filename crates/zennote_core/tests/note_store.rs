use zennote_core::{
    DbError, KeyValueStore, KvError, KvResult, MemoryKvStore, NoteStore, PersistenceError,
    StoreConfig, StoreError, ThemePreference,
};

/// Backend whose note reads fail while `fail_reads` is set.
struct UnreadableNotes {
    inner: MemoryKvStore,
    fail_reads: bool,
}

impl KeyValueStore for UnreadableNotes {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        if self.fail_reads && key == "zenNotes" {
            return Err(DbError::MissingRequiredTable("kv_entries").into());
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.inner.set(key, value)
    }
}

fn durable_count(backend: &MemoryKvStore) -> usize {
    let raw = backend.get("zenNotes").unwrap().unwrap();
    serde_json::from_str::<Vec<serde_json::Value>>(&raw)
        .unwrap()
        .len()
}

fn store_with(titles: &[&str]) -> NoteStore<MemoryKvStore> {
    let mut store = NoteStore::load(MemoryKvStore::new());
    // Created oldest-first so the list reads newest-first.
    for title in titles.iter().rev() {
        store.create(title, "").unwrap();
    }
    store
}

fn ids(store: &NoteStore<MemoryKvStore>) -> Vec<String> {
    store.list(None).into_iter().map(|note| note.id).collect()
}

#[test]
fn create_prepends_trimmed_note_and_persists() {
    let mut store = NoteStore::load(MemoryKvStore::new());
    let first = store.create("  first  ", "  body  ").unwrap();
    let second = store.create("", "only content").unwrap();

    assert_eq!(first.title, "first");
    assert_eq!(first.content, "body");
    assert_eq!(second.title, "Untitled");
    assert_ne!(first.id, second.id);
    assert_eq!(ids(&store), vec![second.id.clone(), first.id.clone()]);

    let raw = store.backend().get("zenNotes").unwrap().unwrap();
    let persisted: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[0]["id"], second.id.as_str());
    assert_eq!(persisted[0]["title"], "Untitled");
    assert!(persisted[0]["date"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn create_rejects_blank_note_without_touching_collection() {
    let mut store = store_with(&["keep"]);
    let before = store.list(None);

    let err = store.create("   ", "\n").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.list(None), before);
}

#[test]
fn update_preserves_id_and_position() {
    let mut store = store_with(&["a", "b", "c"]);
    let target = store.list(None)[1].clone();

    let updated = store.update(&target.id, "  ", "new body").unwrap();
    assert_eq!(updated.id, target.id);
    assert_eq!(updated.title, "Untitled");
    assert_eq!(updated.content, "new body");

    let listed = store.list(None);
    assert_eq!(listed[1], updated);
    assert_eq!(store.get(&target.id), Some(&updated));
    assert_eq!(listed.len(), 3);
}

#[test]
fn update_unknown_id_is_not_found_and_changes_nothing() {
    let mut store = store_with(&["a"]);
    let before = store.list(None);

    let err = store.update("does-not-exist", "t", "c").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref id) if id == "does-not-exist"));
    assert_eq!(store.list(None), before);
}

#[test]
fn delete_removes_exactly_one_and_unknown_is_noop() {
    let mut store = store_with(&["a", "b", "c"]);
    let target = store.list(None)[0].id.clone();

    assert!(store.delete(&target).unwrap());
    assert_eq!(store.len(), 2);
    assert!(store.get(&target).is_none());

    let before = store.list(None);
    assert!(!store.delete("missing").unwrap());
    assert!(!store.delete(&target).unwrap());
    assert_eq!(store.list(None), before);
}

#[test]
fn list_without_filter_equals_empty_filter() {
    let store = store_with(&["x", "y"]);
    assert_eq!(store.list(None), store.list(Some("")));
    assert_eq!(store.list(None).len(), 2);
}

#[test]
fn list_filters_case_insensitively_on_title_or_content() {
    let mut store = NoteStore::load(MemoryKvStore::new());
    store.create("baz", "").unwrap();
    let foo = store.create("Foo bar", "").unwrap();

    let hits = store.list(Some("FOO"));
    assert_eq!(hits, vec![foo]);

    let by_content = store.create("other", "has FoOd inside").unwrap();
    let hits = store.list(Some("foo"));
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0], by_content);
}

#[test]
fn reload_yields_identical_sequence() {
    let mut store = store_with(&["one", "two", "three"]);
    let middle = store.list(None)[1].id.clone();
    store.update(&middle, "two!", "edited").unwrap();
    let before = store.list(None);

    let reloaded = NoteStore::load(store.into_backend());
    assert_eq!(reloaded.list(None), before);
}

#[test]
fn malformed_json_loads_as_empty_collection() {
    let mut backend = MemoryKvStore::new();
    backend.set("zenNotes", "{not json").unwrap();
    let store = NoteStore::load(backend);
    assert!(store.is_empty());

    let mut backend = MemoryKvStore::new();
    backend.set("zenNotes", r#"{"id":"1"}"#).unwrap();
    assert!(NoteStore::load(backend).is_empty());
}

#[test]
fn failed_read_at_load_never_overwrites_stored_notes() {
    let seeded = store_with(&["one", "two"]).into_backend();
    let mut store = NoteStore::load(UnreadableNotes {
        inner: seeded,
        fail_reads: true,
    });
    assert!(store.is_empty());
    assert!(store.is_load_degraded());
    assert!(!store.is_dirty());

    let err = store.create("three", "").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::UnreadCollection)
    ));
    assert!(store.is_dirty());
    assert_eq!(store.len(), 1);
    let id = store.list(None)[0].id.clone();

    assert!(matches!(
        store.update(&id, "three", "edited"),
        Err(StoreError::Persistence(PersistenceError::UnreadCollection))
    ));
    assert!(matches!(
        store.delete(&id),
        Err(StoreError::Persistence(PersistenceError::UnreadCollection))
    ));
    assert!(store.is_empty());
    assert_eq!(durable_count(&store.backend().inner), 2);

    store.backend_mut().fail_reads = false;
    let healthy = NoteStore::load(store.backend().inner.clone());
    assert!(!healthy.is_load_degraded());
    assert_eq!(healthy.len(), 2);
}

#[test]
fn explicit_save_after_failed_read_replaces_stored_notes() {
    let seeded = store_with(&["one", "two"]).into_backend();
    let mut store = NoteStore::load(UnreadableNotes {
        inner: seeded,
        fail_reads: true,
    });
    assert!(store.create("kept", "").is_err());

    store.save().unwrap();
    assert!(!store.is_load_degraded());
    assert!(!store.is_dirty());
    assert_eq!(durable_count(&store.backend().inner), 1);

    store.create("next", "").unwrap();
    assert_eq!(durable_count(&store.backend().inner), 2);
}

#[test]
fn persistence_failure_is_surfaced_and_retryable() {
    let mut store = NoteStore::load(MemoryKvStore::with_quota(64));

    let err = store
        .create("a title long enough", "and content that will not fit in quota")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::Storage(KvError::QuotaExceeded { .. }))
    ));
    assert!(err.to_string().contains("not saved"));
    assert!(store.is_dirty());
    assert_eq!(store.len(), 1);
    assert_eq!(store.backend().get("zenNotes").unwrap(), None);

    store.backend_mut().set_quota(None);
    store.save().unwrap();
    assert!(!store.is_dirty());

    let reloaded = NoteStore::load(store.into_backend());
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn custom_keys_isolate_collections() {
    let mut backend = MemoryKvStore::new();
    {
        let mut work = NoteStore::load_with_config(&mut backend, StoreConfig::with_prefix("work"));
        work.create("work note", "").unwrap();
    }

    let default_store = NoteStore::load(backend.clone());
    assert!(default_store.is_empty());
    let work = NoteStore::load_with_config(backend, StoreConfig::with_prefix("work"));
    assert_eq!(work.len(), 1);
}

#[test]
fn theme_preference_shares_the_note_backend() {
    let mut store = NoteStore::load(MemoryKvStore::new());
    assert_eq!(store.theme(), ThemePreference::Light);

    store.set_theme(ThemePreference::Dark).unwrap();
    assert_eq!(store.theme(), ThemePreference::Dark);
    assert_eq!(
        store.backend().get("theme").unwrap().as_deref(),
        Some("dark")
    );
}
