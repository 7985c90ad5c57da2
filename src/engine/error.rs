//! engine::error
//!
//! Error type for the upsert and export engines.
//!
//! Every failure carries one of four kinds so callers can branch on the
//! category without matching message text:
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `SchemaViolation` | key not declared, or a value assigned to a lazy/template key |
//! | `ConstraintViolation` | value fails type or options checks |
//! | `NamingViolation` | a re-keyed export name fails the naming rule |
//! | `CollaboratorFailure` | the store failed during init/get/set |

use serde::Serialize;
use thiserror::Error;

use crate::core::naming::NAMING_ERROR_MESSAGE;
use crate::core::validate::ValidationError;
use crate::store::StoreError;

/// Category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    SchemaViolation,
    ConstraintViolation,
    NamingViolation,
    CollaboratorFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::NamingViolation => "naming violation",
            ErrorKind::CollaboratorFailure => "collaborator failure",
        };
        f.write_str(s)
    }
}

/// Why a key was rejected by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    Undeclared,
    LazyAssigned,
    TemplateAssigned,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaViolation::Undeclared => f.write_str("Key is not declared on schema"),
            SchemaViolation::LazyAssigned => {
                f.write_str("Key declared as \"lazy\" cannot be assigned a value")
            }
            SchemaViolation::TemplateAssigned => {
                f.write_str("Key declared as \"template\" cannot be assigned a value")
            }
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed for config: \"{key}\"\n{violation}")]
    Schema {
        key: String,
        violation: SchemaViolation,
    },

    /// The reason is part of the message, not the error chain.
    #[error("Validation failed for config: \"{key}\"\n{reason}")]
    Constraint {
        key: String,
        reason: ValidationError,
    },

    #[error("ConfigKey \"{key}\" {}", NAMING_ERROR_MESSAGE)]
    Naming { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The error's category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Schema { .. } => ErrorKind::SchemaViolation,
            EngineError::Constraint { .. } => ErrorKind::ConstraintViolation,
            EngineError::Naming { .. } => ErrorKind::NamingViolation,
            EngineError::Store(_) => ErrorKind::CollaboratorFailure,
        }
    }

    /// The offending key, when the error concerns one.
    pub fn key(&self) -> Option<&str> {
        match self {
            EngineError::Schema { key, .. }
            | EngineError::Constraint { key, .. }
            | EngineError::Naming { key } => Some(key),
            EngineError::Store(_) => None,
        }
    }
}
