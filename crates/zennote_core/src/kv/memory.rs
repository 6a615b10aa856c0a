//! Volatile key-value store.

use super::{check_quota, KeyValueStore, KvResult};
use std::collections::BTreeMap;

/// In-process key-value store, optionally capped by a byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `quota_bytes` total usage.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Changes the quota; `None` removes it. Existing entries are kept.
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    /// Current usage in key plus value bytes.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        let current = self
            .entries
            .get(key)
            .map_or(0, |existing| key.len() + existing.len());
        check_quota(key, value, self.used_bytes() - current, self.quota_bytes)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::kv::{KeyValueStore, KvError};

    #[test]
    fn set_then_get_returns_latest_value() {
        let mut store = MemoryKvStore::new();
        assert_eq!(store.get("theme").unwrap(), None);

        store.set("theme", "dark").unwrap();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        assert_eq!(store.get("zenNotes").unwrap(), None);
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let mut store = MemoryKvStore::with_quota(12);
        store.set("k", "small").unwrap();

        let err = store.set("k", "much too large").unwrap_err();
        assert!(matches!(
            err,
            KvError::QuotaExceeded {
                limit_bytes: 12,
                ..
            }
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn quota_counts_replaced_value_only_once() {
        let mut store = MemoryKvStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        store.set("k", "987654321").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }
}
