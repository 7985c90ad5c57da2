//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves schema, set and store from flags and tool config
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT write to the store directly.
//!
//! # Async Commands
//!
//! Store access is async. Each handler is a synchronous wrapper that
//! builds a tokio runtime and blocks on its async implementation.

mod common;
mod completion;
mod eval;
mod export;
mod upsert;

pub use completion::completion;
pub use eval::eval;
pub use export::{export, ExportArgs};
pub use upsert::{upsert, UpsertArgs};

use crate::cli::args::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Eval { schema, set } => eval(ctx, schema.as_deref(), set.as_deref()),
        Command::Upsert {
            schema,
            set,
            configs,
            pipe,
            dry_run,
            json,
        } => upsert(
            ctx,
            UpsertArgs {
                schema: schema.as_deref(),
                set: set.as_deref(),
                configs,
                pipe: pipe.as_deref(),
                dry_run,
                json,
            },
        ),
        Command::Export {
            pipe,
            schema,
            set,
            all,
            prefix,
            casing,
            format,
        } => export(
            ctx,
            ExportArgs {
                pipe: pipe.as_deref(),
                schema: schema.as_deref(),
                set: set.as_deref(),
                all,
                prefix: prefix.as_deref(),
                casing: casing.map(Into::into),
                format: format.into(),
            },
        ),
        Command::Completion { shell } => completion(shell),
    }
}
