//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$CFGSYNC_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cfgsync/config.toml`
//! 3. `~/.cfgsync/config.toml` (canonical write location)
//!
//! # Project Config
//!
//! Located at `<project>/.cfgsync/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `set` must be a valid set path).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::ConfigSet;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [store]
/// provider = "json-file"
/// path = "/home/me/.cfgsync/store.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Store settings
    pub store: Option<StoreSettings>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(store) = &self.store {
            store.validate()?;
        }
        Ok(())
    }
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// schema = "config/app.cfgu.json"
/// set = "dev"
///
/// [store]
/// path = ".cfgsync/store.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Default schema file
    pub schema: Option<PathBuf>,

    /// Default set path
    pub set: Option<String>,

    /// Store settings (override global)
    pub store: Option<StoreSettings>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(set) = &self.set {
            ConfigSet::new(set.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid default set: {}", e)))?;
        }

        if let Some(store) = &self.store {
            store.validate()?;
        }

        Ok(())
    }
}

/// Store selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// Provider to use ("json-file" or "memory")
    pub provider: Option<String>,

    /// Backing file for file-based providers
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// Valid store providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["json-file", "memory"];

    /// Validate the store configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid store provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
