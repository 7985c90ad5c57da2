//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so quiet mode and
//! machine-readable formats are handled in one place. Diagnostics go
//! through `tracing` instead.

pub mod output;
