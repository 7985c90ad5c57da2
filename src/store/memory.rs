//! store::memory
//!
//! Process-local store. Contents are lost when the store is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{ConfigStore, StoreError};
use crate::core::types::{ConfigQuery, ConfigRecord};

type Entries = BTreeMap<(String, String), String>;

/// In-memory store keyed by `(set, key)`.
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    entries: Arc<Mutex<Entries>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`. Empty values are skipped.
    pub fn with_records(records: impl IntoIterator<Item = ConfigRecord>) -> Self {
        let entries = records
            .into_iter()
            .filter(|r| !r.is_deletion())
            .map(|r| ((r.set, r.key), r.value))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Snapshot of every stored record, ordered by set then key.
    pub fn records(&self) -> Result<Vec<ConfigRecord>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .map(|((set, key), value)| ConfigRecord::new(set.clone(), key.clone(), value.clone()))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::ReadError("memory store mutex poisoned".into()))
    }
}

/// Look up `queries` in `entries`, skipping absent keys.
pub(crate) fn lookup(entries: &Entries, queries: &[ConfigQuery]) -> Vec<ConfigRecord> {
    queries
        .iter()
        .filter_map(|q| {
            entries
                .get(&(q.set.clone(), q.key.clone()))
                .map(|value| ConfigRecord::new(q.set.clone(), q.key.clone(), value.clone()))
        })
        .collect()
}

/// Apply a write batch to `entries`.
pub(crate) fn apply(entries: &mut Entries, records: &[ConfigRecord]) {
    for record in records {
        let id = (record.set.clone(), record.key.clone());
        if record.is_deletion() {
            entries.remove(&id);
        } else {
            entries.insert(id, record.value.clone());
        }
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    fn store_type(&self) -> &str {
        "memory"
    }

    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, queries: &[ConfigQuery]) -> Result<Vec<ConfigRecord>, StoreError> {
        let entries = self.lock()?;
        Ok(lookup(&entries, queries))
    }

    async fn set(&self, records: &[ConfigRecord]) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::WriteError("memory store mutex poisoned".into()))?;
        apply(&mut entries, records);
        Ok(())
    }
}
