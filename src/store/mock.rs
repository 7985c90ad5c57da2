//! store::mock
//!
//! Mock store for deterministic testing.
//!
//! # Design
//!
//! Wraps an [`InMemoryConfigStore`], records every call, and can be told to
//! fail a specific operation.
//!
//! # Example
//!
//! ```
//! use cfgsync::core::types::{ConfigQuery, ConfigRecord};
//! use cfgsync::store::mock::{FailOn, MockConfigStore, MockOperation};
//! use cfgsync::store::{ConfigStore, StoreError};
//!
//! # tokio_test::block_on(async {
//! let store = MockConfigStore::with_records(vec![ConfigRecord::new("dev", "A", "1")]);
//! let found = store.get(&[ConfigQuery::new("dev", "A")]).await.unwrap();
//! assert_eq!(found[0].value, "1");
//!
//! let failing =
//!     MockConfigStore::new().fail_on(FailOn::Set(StoreError::WriteError("boom".into())));
//! assert!(failing.set(&[ConfigRecord::new("dev", "A", "2")]).await.is_err());
//! assert_eq!(failing.set_calls(), 1);
//! # });
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::memory::InMemoryConfigStore;
use super::traits::{ConfigStore, StoreError};
use crate::core::types::{ConfigQuery, ConfigRecord};

/// Mock store for testing.
///
/// Clones share state, so a test can keep a handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockConfigStore {
    backing: InMemoryConfigStore,
    inner: Arc<Mutex<MockStoreInner>>,
}

#[derive(Debug, Default)]
struct MockStoreInner {
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Init(StoreError),
    Get(StoreError),
    Set(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Init,
    Get { queries: Vec<ConfigQuery> },
    Set { records: Vec<ConfigRecord> },
}

impl MockConfigStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with pre-existing records.
    pub fn with_records(records: Vec<ConfigRecord>) -> Self {
        Self {
            backing: InMemoryConfigStore::with_records(records),
            inner: Arc::default(),
        }
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.state().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Number of `set` calls issued, including failed ones.
    pub fn set_calls(&self) -> usize {
        self.state()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::Set { .. }))
            .count()
    }

    /// Number of `get` calls issued, including failed ones.
    pub fn get_calls(&self) -> usize {
        self.state()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::Get { .. }))
            .count()
    }

    /// Snapshot of stored records (for test verification).
    pub fn records(&self) -> Vec<ConfigRecord> {
        self.backing.records().unwrap_or_default()
    }

    /// Stored value for `(set, key)`, if any.
    pub fn value(&self, set: &str, key: &str) -> Option<String> {
        self.records()
            .into_iter()
            .find(|r| r.set == set && r.key == key)
            .map(|r| r.value)
    }

    fn state(&self) -> MutexGuard<'_, MockStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: MockOperation) {
        self.state().operations.push(op);
    }

    fn check_fail(&self, op: &MockOperation) -> Result<(), StoreError> {
        let state = self.state();
        match (&state.fail_on, op) {
            (Some(FailOn::Init(e)), MockOperation::Init)
            | (Some(FailOn::Get(e)), MockOperation::Get { .. })
            | (Some(FailOn::Set(e)), MockOperation::Set { .. }) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    fn record_and_check(&self, op: MockOperation) -> Result<(), StoreError> {
        let result = self.check_fail(&op);
        self.record(op);
        result
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    fn store_type(&self) -> &str {
        "mock"
    }

    async fn init(&self) -> Result<(), StoreError> {
        self.record_and_check(MockOperation::Init)?;
        self.backing.init().await
    }

    async fn get(&self, queries: &[ConfigQuery]) -> Result<Vec<ConfigRecord>, StoreError> {
        self.record_and_check(MockOperation::Get {
            queries: queries.to_vec(),
        })?;
        self.backing.get(queries).await
    }

    async fn set(&self, records: &[ConfigRecord]) -> Result<(), StoreError> {
        self.record_and_check(MockOperation::Set {
            records: records.to_vec(),
        })?;
        self.backing.set(records).await
    }
}
