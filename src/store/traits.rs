//! store::traits
//!
//! Config store trait definition.
//!
//! # Design
//!
//! A store is a key-value backend scoped by set path. All operations are
//! batched: one `get` for many queries, one `set` for many records. A record
//! with an empty value is a deletion.
//!
//! # Contract
//!
//! Implementations MUST:
//! - Make `init()` idempotent
//! - Omit missing keys from `get()` results (never return empty values)
//! - Apply a `set()` batch as a whole or not at all
//! - Be thread-safe (Send + Sync)
//! - Never include stored values in error messages

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{ConfigQuery, ConfigRecord};

/// Errors from store operations.
///
/// Note: error messages never include stored values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be prepared for use.
    #[error("failed to initialize store: {0}")]
    InitError(String),

    /// Failed to read from the store.
    #[error("failed to read from store: {0}")]
    ReadError(String),

    /// Failed to write to the store.
    #[error("failed to write to store: {0}")]
    WriteError(String),

    /// Another process holds the store lock.
    #[error("store is locked: {0}")]
    Locked(String),

    /// Provider not available or not configured.
    #[error("store provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for config store backends.
///
/// # Example
///
/// ```
/// use cfgsync::core::types::{ConfigQuery, ConfigRecord};
/// use cfgsync::store::{ConfigStore, InMemoryConfigStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryConfigStore::new();
/// store.init().await.unwrap();
/// store.set(&[ConfigRecord::new("dev", "PORT", "8080")]).await.unwrap();
///
/// let found = store.get(&[ConfigQuery::new("dev", "PORT")]).await.unwrap();
/// assert_eq!(found[0].value, "8080");
/// # });
/// ```
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Short provider name (e.g. "memory", "json-file").
    fn store_type(&self) -> &str;

    /// Prepare the store for use. Safe to call repeatedly.
    async fn init(&self) -> Result<(), StoreError>;

    /// Fetch the records matching `queries`.
    ///
    /// Keys with no stored value are absent from the result.
    async fn get(&self, queries: &[ConfigQuery]) -> Result<Vec<ConfigRecord>, StoreError>;

    /// Write a batch of records. Empty values delete the key.
    async fn set(&self, records: &[ConfigRecord]) -> Result<(), StoreError>;
}
