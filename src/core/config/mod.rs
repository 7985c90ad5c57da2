//! core::config
//!
//! Tool configuration schema and loading.
//!
//! # Overview
//!
//! cfgsync has two configuration scopes:
//! - **Global**: User-level settings (store selection)
//! - **Project**: Per-directory defaults (schema file, set, store)
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$CFGSYNC_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cfgsync/config.toml`
//! 3. `~/.cfgsync/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use cfgsync::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//!
//! println!("Store provider: {}", config.store_provider());
//! if let Some(set) = config.default_set() {
//!     println!("Default set: {}", set);
//! }
//! ```

pub mod schema;

pub use schema::{GlobalConfig, ProjectConfig, StoreSettings};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an explicit global config file.
pub const CONFIG_ENV_VAR: &str = "CFGSYNC_CONFIG";

/// Directory name used for both global and project config.
pub const CONFIG_DIR_NAME: &str = ".cfgsync";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules: project config overrides
/// global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if found)
    pub project: Option<ProjectConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads project-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), project_dir)
    }

    /// Load configuration from an explicit global file and project directory.
    pub fn load_from(
        global_file: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = match global_file {
            Some(path) if path.exists() => (Self::read_toml::<GlobalConfig>(path)?, Some(path)),
            _ => (GlobalConfig::default(), None),
        };

        let project_file = project_dir.map(Self::project_config_path);
        let (project, project_path) = match project_file {
            Some(path) if path.exists() => {
                (Some(Self::read_toml::<ProjectConfig>(&path)?), Some(path))
            }
            _ => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path: global_path.map(Path::to_path_buf),
                project_path,
            },
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("cfgsync/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a TOML config file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.cfgsync/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Get the path for project config inside `project_dir`.
    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_DIR_NAME).join("config.toml")
    }

    /// Write project config atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_project(
        project_dir: &Path,
        config: &ProjectConfig,
    ) -> Result<PathBuf, ConfigError> {
        let path = Self::project_config_path(project_dir);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn store_settings(&self) -> impl Iterator<Item = &StoreSettings> {
        self.project
            .as_ref()
            .and_then(|p| p.store.as_ref())
            .into_iter()
            .chain(self.global.store.as_ref())
    }

    /// Get the store provider.
    ///
    /// Defaults to "json-file" if not configured.
    pub fn store_provider(&self) -> &str {
        self.store_settings()
            .find_map(|s| s.provider.as_deref())
            .unwrap_or("json-file")
    }

    /// Get the configured store file, if any.
    pub fn store_path(&self) -> Option<&Path> {
        self.store_settings().find_map(|s| s.path.as_deref())
    }

    /// Get the default schema file.
    pub fn schema_path(&self) -> Option<&Path> {
        self.project.as_ref().and_then(|p| p.schema.as_deref())
    }

    /// Get the default set path.
    pub fn default_set(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.set.as_deref())
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
