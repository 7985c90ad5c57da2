//! store::json_file
//!
//! File-backed store.
//!
//! # Format
//!
//! The file holds a JSON array of records, ordered by set then key:
//!
//! ```json
//! [
//!   { "set": "dev", "key": "PORT", "value": "8080" },
//!   { "set": "prod", "key": "PORT", "value": "80" }
//! ]
//! ```
//!
//! # Durability
//!
//! - Every write batch holds an exclusive lock on `<file>.lock` for its
//!   whole read-modify-write cycle
//! - Writes are atomic (write to temp file, then rename)
//! - On Unix the file is created with 0600 permissions

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use async_trait::async_trait;
use fs2::FileExt;

use super::memory::{apply, lookup};
use super::traits::{ConfigStore, StoreError};
use crate::core::config::CONFIG_DIR_NAME;
use crate::core::types::{ConfigQuery, ConfigRecord};

/// Default store file name inside the config directory.
pub const DEFAULT_STORE_FILE: &str = "store.json";

/// Store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

/// Held lock on the store's lock file. Released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl JsonFileConfigStore {
    /// Create a store at the default location, `~/.cfgsync/store.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or_else(|| {
            StoreError::ProviderNotAvailable("cannot determine home directory".into())
        })?;
        Ok(Self::with_path(
            home.join(CONFIG_DIR_NAME).join(DEFAULT_STORE_FILE),
        ))
    }

    /// Create a store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn acquire(&self, exclusive: bool) -> Result<StoreLock, StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::InitError(format!("cannot create directory: {}", e)))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| StoreError::Locked(format!("cannot open lock file: {}", e)))?;

        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| StoreError::Locked(format!("{}: {}", self.path.display(), e)))?;

        Ok(StoreLock { file })
    }

    /// Read all records. A missing file reads as empty.
    fn read_entries(&self) -> Result<BTreeMap<(String, String), String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::ReadError(format!("cannot read store file: {}", e)))?;

        let records: Vec<ConfigRecord> = serde_json::from_str(&content)
            .map_err(|e| StoreError::ReadError(format!("cannot parse store file: {}", e)))?;

        Ok(records
            .into_iter()
            .filter(|r| !r.is_deletion())
            .map(|r| ((r.set, r.key), r.value))
            .collect())
    }

    fn write_entries(
        &self,
        entries: &BTreeMap<(String, String), String>,
    ) -> Result<(), StoreError> {
        let records: Vec<ConfigRecord> = entries
            .iter()
            .map(|((set, key), value)| ConfigRecord::new(set.clone(), key.clone(), value.clone()))
            .collect();

        let content = serde_json::to_string_pretty(&records)
            .map_err(|e| StoreError::WriteError(format!("cannot serialize store: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;

            #[cfg(unix)]
            {
                file.set_permissions(fs::Permissions::from_mode(0o600))
                    .map_err(|e| StoreError::WriteError(format!("cannot set permissions: {}", e)))?;
            }

            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::WriteError(format!("cannot write store: {}", e)))?;

            file.sync_all()
                .map_err(|e| StoreError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::WriteError(format!("cannot rename temp file: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    fn store_type(&self) -> &str {
        "json-file"
    }

    async fn init(&self) -> Result<(), StoreError> {
        let _lock = self.acquire(true)?;
        if self.path.exists() {
            // Surface a corrupt file at init rather than mid-command.
            self.read_entries()?;
            return Ok(());
        }
        self.write_entries(&BTreeMap::new())
            .map_err(|e| StoreError::InitError(e.to_string()))
    }

    async fn get(&self, queries: &[ConfigQuery]) -> Result<Vec<ConfigRecord>, StoreError> {
        let _lock = self.acquire(false)?;
        let entries = self.read_entries()?;
        Ok(lookup(&entries, queries))
    }

    async fn set(&self, records: &[ConfigRecord]) -> Result<(), StoreError> {
        let _lock = self.acquire(true)?;
        let mut entries = self.read_entries()?;
        apply(&mut entries, records);
        self.write_entries(&entries)?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "wrote store file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, JsonFileConfigStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = JsonFileConfigStore::with_path(temp.path().join("store.json"));
        (temp, store)
    }

    #[tokio::test]
    async fn init_creates_empty_array() {
        let (_temp, store) = create_test_store();
        store.init().await.expect("init");

        let content = fs::read_to_string(store.path()).expect("read");
        assert_eq!(content.trim(), "[]");
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let (_temp, store) = create_test_store();
        store.init().await.expect("first init");
        store
            .set(&[ConfigRecord::new("dev", "A", "1")])
            .await
            .expect("set");
        store.init().await.expect("second init");

        let found = store.get(&[ConfigQuery::new("dev", "A")]).await.expect("get");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn init_rejects_corrupt_file() {
        let (_temp, store) = create_test_store();
        fs::write(store.path(), "{not json").expect("write");

        let err = store.init().await.unwrap_err();
        assert!(err.to_string().contains("cannot parse"));
    }

    #[tokio::test]
    async fn get_without_file_is_empty() {
        let (_temp, store) = create_test_store();
        let found = store.get(&[ConfigQuery::new("", "A")]).await.expect("get");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn set_update_delete() {
        let (_temp, store) = create_test_store();
        store.init().await.expect("init");

        store
            .set(&[
                ConfigRecord::new("dev", "A", "1"),
                ConfigRecord::new("dev", "B", "2"),
            ])
            .await
            .expect("set");
        store
            .set(&[
                ConfigRecord::new("dev", "A", "10"),
                ConfigRecord::new("dev", "B", ""),
            ])
            .await
            .expect("update");

        let found = store
            .get(&[ConfigQuery::new("dev", "A"), ConfigQuery::new("dev", "B")])
            .await
            .expect("get");
        assert_eq!(found, vec![ConfigRecord::new("dev", "A", "10")]);
    }

    #[tokio::test]
    async fn sets_are_isolated() {
        let (_temp, store) = create_test_store();
        store
            .set(&[ConfigRecord::new("dev", "A", "1")])
            .await
            .expect("set");

        let found = store.get(&[ConfigQuery::new("prod", "A")]).await.expect("get");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn persistence_across_instances() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("nested").join("store.json");

        JsonFileConfigStore::with_path(path.clone())
            .set(&[ConfigRecord::new("", "A", "root")])
            .await
            .expect("set");

        let found = JsonFileConfigStore::with_path(path)
            .get(&[ConfigQuery::new("", "A")])
            .await
            .expect("get");
        assert_eq!(found[0].value, "root");
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let (_temp, store) = create_test_store();
        store
            .set(&[ConfigRecord::new("dev", "A", "1")])
            .await
            .expect("set");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn permissions_0600_on_unix() {
        let (_temp, store) = create_test_store();
        store.init().await.expect("init");

        let mode = fs::metadata(store.path()).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
