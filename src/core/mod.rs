//! core
//!
//! Core domain types, schemas, and rules for cfgsync.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ConfigSet, ConfigQuery, ConfigRecord
//! - [`naming`] - Naming rules for keys, schemas and set segments
//! - [`schema`] - Key declarations (Cfgu) and schema loading
//! - [`validate`] - Type and option checks for values
//! - [`config`] - Tool configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at construction time
//! - Schemas are strict and self-describing
//! - All validation is deterministic

pub mod config;
pub mod naming;
pub mod schema;
pub mod types;
pub mod validate;
