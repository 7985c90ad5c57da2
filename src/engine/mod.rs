//! engine
//!
//! The upsert (write) and export (read) engines, plus the evaluated
//! pipeline they exchange.
//!
//! # Architecture
//!
//! ```text
//! store ──eval──> EvaluatedPipeline ──export──> key/value map
//!                       │
//!     explicit configs ─┴──upsert──> diff ──> store.set (unless dry)
//! ```
//!
//! - [`eval`] - Pipeline data model and a store-only pipeline loader
//! - [`upsert`] - Diff/validate/apply against a store
//! - [`export`] - Filter and re-key a pipeline
//! - [`error`] - Error taxonomy shared by both engines
//!
//! # Invariants
//!
//! - No-op changes never appear in a diff
//! - All validation completes before the store is written
//! - A store write is a single batch
//! - An export either succeeds entirely or returns no output

pub mod error;
pub mod eval;
pub mod export;
pub mod upsert;

pub use error::{EngineError, ErrorKind};
pub use eval::{evaluate_from_store, EvaluatedConfig, EvaluatedConfigOrigin, EvaluatedPipeline};
pub use export::{ExportCommand, KeyCasing};
pub use upsert::{ConfigDiff, ConfigDiffAction, UpsertCommand, UpsertOutput};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Explicit global config file.
    pub config: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Store provider override.
    pub store: Option<String>,
    /// Store file override.
    pub store_path: Option<PathBuf>,
}
