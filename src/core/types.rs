//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ConfigSet`] - Validated set path (the namespace configs live under)
//! - [`ConfigQuery`] - A `(set, key)` lookup against a store
//! - [`ConfigRecord`] - A `(set, key, value)` unit persisted in a store
//!
//! # Validation
//!
//! Set paths are validated at construction time. Invalid paths cannot be
//! represented.
//!
//! # Examples
//!
//! ```
//! use cfgsync::core::types::ConfigSet;
//!
//! let set = ConfigSet::new("/prod/eu-west/").unwrap();
//! assert_eq!(set.path(), "prod/eu-west");
//! assert_eq!(set.hierarchy(), vec!["", "prod", "prod/eu-west"]);
//!
//! assert!(ConfigSet::new("prod//eu").is_err());
//! assert!(ConfigSet::new("prod/this").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming::{validate_naming, NAMING_ERROR_MESSAGE};

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid set path \"{path}\": segment \"{segment}\" {message}")]
    InvalidSetPath {
        path: String,
        segment: String,
        message: &'static str,
    },
}

/// A validated set path.
///
/// The root set is the empty path, displayed as `/`. Leading and trailing
/// separators are stripped; every segment must satisfy the naming rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigSet(String);

impl ConfigSet {
    /// Path separator between set segments.
    pub const SEPARATOR: char = '/';

    /// Display form of the root set.
    pub const ROOT_LABEL: &'static str = "/";

    /// Create a new validated set.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSetPath` if any segment violates the naming rule.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let raw = path.into();
        let normalized = raw
            .trim()
            .trim_start_matches(Self::SEPARATOR)
            .trim_end_matches(Self::SEPARATOR)
            .to_string();

        if normalized.is_empty() {
            return Ok(Self::root());
        }

        for segment in normalized.split(Self::SEPARATOR) {
            if !validate_naming(segment) {
                return Err(TypeError::InvalidSetPath {
                    path: raw,
                    segment: segment.to_string(),
                    message: NAMING_ERROR_MESSAGE,
                });
            }
        }

        Ok(Self(normalized))
    }

    /// The root set.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the root set.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized path (empty for root).
    pub fn path(&self) -> &str {
        &self.0
    }

    /// All ancestor paths from root down to (and including) this set.
    pub fn hierarchy(&self) -> Vec<String> {
        let mut hierarchy = vec![String::new()];
        if self.is_root() {
            return hierarchy;
        }

        let mut current = String::new();
        for segment in self.0.split(Self::SEPARATOR) {
            if !current.is_empty() {
                current.push(Self::SEPARATOR);
            }
            current.push_str(segment);
            hierarchy.push(current.clone());
        }
        hierarchy
    }
}

impl TryFrom<String> for ConfigSet {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ConfigSet> for String {
    fn from(set: ConfigSet) -> Self {
        set.0
    }
}

impl AsRef<str> for ConfigSet {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfigSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "{}", Self::ROOT_LABEL)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A single lookup against a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigQuery {
    /// Set path (normalized, empty for root).
    pub set: String,
    /// Config key.
    pub key: String,
}

impl ConfigQuery {
    pub fn new(set: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            key: key.into(),
        }
    }
}

/// The unit persisted to and retrieved from a store.
///
/// An empty `value` in a write batch means "delete this key".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Set path (normalized, empty for root).
    pub set: String,
    /// Config key.
    pub key: String,
    /// Stored value.
    pub value: String,
}

impl ConfigRecord {
    pub fn new(set: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this record represents a deletion.
    pub fn is_deletion(&self) -> bool {
        self.value.is_empty()
    }

    /// The query that would retrieve this record.
    pub fn query(&self) -> ConfigQuery {
        ConfigQuery::new(self.set.clone(), self.key.clone())
    }
}
