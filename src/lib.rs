//! cfgsync - Schema-driven config reconciliation
//!
//! cfgsync keeps configuration values in a store in line with a declared
//! schema. It computes the minimal set of additions, updates and deletions
//! needed for a set, validates every value before anything is written, and
//! applies the change as a single batch. The same evaluated values can be
//! exported as JSON or dotenv for other tools.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Upsert (diff/validate/apply) and export (filter/re-key)
//! - [`store`] - Config store abstraction and backends
//! - [`core`] - Domain types, schemas, validation and tool configuration
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A diff never contains a key whose value does not change
//! 2. Nothing is written unless every supplied value is valid
//! 3. Each upsert reads once and writes once
//! 4. Dry runs never write

pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;
