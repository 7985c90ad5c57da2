//! cli
//!
//! Command-line interface layer for cfgsync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//! - Does NOT write to stores directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. The filter comes from
//! `CFGSYNC_LOG` (e.g. `CFGSYNC_LOG=cfgsync=debug`), defaulting to `warn`.
//! `--debug` forces `debug`.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "CFGSYNC_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        config: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        store: cli.store.clone(),
        store_path: cli.store_path.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
