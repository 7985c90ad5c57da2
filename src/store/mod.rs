//! store
//!
//! Config store abstraction.
//!
//! # Architecture
//!
//! Configs are persisted through the [`ConfigStore`] trait, which has
//! multiple implementations:
//!
//! - [`JsonFileConfigStore`]: JSON file at `~/.cfgsync/store.json` (default)
//! - [`InMemoryConfigStore`]: process-local map, useful for dry runs and tests
//! - [`mock::MockConfigStore`]: in-memory with call recording and failure injection
//!
//! # Provider Selection
//!
//! Use [`create_store`] to create a store from tool configuration:
//!
//! ```
//! use cfgsync::core::config::StoreSettings;
//! use cfgsync::store::{create_store, ConfigStore};
//!
//! let settings = StoreSettings {
//!     provider: Some("memory".to_string()),
//!     path: None,
//! };
//! let store = create_store(&settings).unwrap();
//! assert_eq!(store.store_type(), "memory");
//! ```

mod json_file;
mod memory;
pub mod mock;
mod traits;

pub use json_file::{JsonFileConfigStore, DEFAULT_STORE_FILE};
pub use memory::InMemoryConfigStore;
pub use traits::{ConfigStore, StoreError};

use crate::core::config::StoreSettings;

/// The default store provider name.
pub const DEFAULT_PROVIDER: &str = "json-file";

/// Create a store based on the configured provider.
///
/// # Providers
///
/// - `"json-file"` (default): [`JsonFileConfigStore`] at `settings.path`,
///   or `~/.cfgsync/store.json` when no path is set
/// - `"memory"`: [`InMemoryConfigStore`]
///
/// # Errors
///
/// - Unknown provider name
/// - Home directory unavailable for the default file location
pub fn create_store(settings: &StoreSettings) -> Result<Box<dyn ConfigStore>, StoreError> {
    let provider = settings.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
    match provider {
        "json-file" => match &settings.path {
            Some(path) => Ok(Box::new(JsonFileConfigStore::with_path(path.clone()))),
            None => Ok(Box::new(JsonFileConfigStore::new()?)),
        },
        "memory" => Ok(Box::new(InMemoryConfigStore::new())),
        other => Err(StoreError::ProviderNotAvailable(format!(
            "unknown store provider: '{}' (valid: {})",
            other,
            StoreSettings::VALID_PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_json_file_store_with_path() {
        let temp = TempDir::new().expect("create temp dir");
        let settings = StoreSettings {
            provider: None,
            path: Some(temp.path().join("store.json")),
        };
        let store = create_store(&settings).expect("create store");
        assert_eq!(store.store_type(), "json-file");
    }

    #[test]
    fn create_unknown_provider() {
        let settings = StoreSettings {
            provider: Some("redis".to_string()),
            path: None,
        };
        match create_store(&settings) {
            Err(StoreError::ProviderNotAvailable(msg)) => assert!(msg.contains("redis")),
            Err(e) => panic!("unexpected error type: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn default_provider_constant() {
        assert_eq!(DEFAULT_PROVIDER, "json-file");
        assert!(StoreSettings::VALID_PROVIDERS.contains(&DEFAULT_PROVIDER));
    }
}
