//! cli::commands::upsert
//!
//! Diff configs against the store and apply the changes.
//!
//! # Example
//!
//! ```bash
//! # Preview
//! cfgsync upsert --schema app.cfgu.json --set dev -c PORT=8080 --dry-run
//!
//! # Apply, machine-readable
//! cfgsync upsert --schema app.cfgu.json --set dev -c PORT=8080 --json
//!
//! # Delete a key
//! cfgsync upsert --schema app.cfgu.json --set dev -c PORT=
//! ```

use std::path::Path;

use anyhow::Result;

use super::common;
use crate::engine::eval::EvaluatedPipeline;
use crate::engine::upsert::UpsertCommand;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Arguments for the upsert command.
#[derive(Debug, Default)]
pub struct UpsertArgs<'a> {
    pub schema: Option<&'a Path>,
    pub set: Option<&'a str>,
    pub configs: Vec<(String, String)>,
    pub pipe: Option<&'a str>,
    pub dry_run: bool,
    pub json: bool,
}

/// Run the upsert command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn upsert(ctx: &Context, args: UpsertArgs<'_>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(upsert_async(ctx, args))
}

async fn upsert_async(ctx: &Context, args: UpsertArgs<'_>) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let config = common::load_config(ctx)?;
    let schema = common::load_schema(ctx, &config, args.schema)?;
    let set = common::resolve_set(&config, args.set)?;
    let store = common::open_store(ctx, &config)?;

    let pipe = match args.pipe {
        Some(source) => common::read_pipe(ctx, source)?,
        None => EvaluatedPipeline::new(),
    };

    if args.configs.is_empty() && pipe.is_empty() {
        output::warn(
            format!(
                "no configs given; deleting every \"{}\" key stored in set {}",
                schema.name(),
                set
            ),
            verbosity,
        );
    }

    let result = UpsertCommand::new(store.as_ref(), &set, &schema)
        .with_configs(args.configs)
        .with_pipe(pipe)
        .dry(args.dry_run)
        .execute()
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::print(output::format_diff(&result.diff), verbosity);
    if !result.diff.is_empty() {
        output::print(
            output::format_diff_summary(&result.diff, result.applied),
            verbosity,
        );
    }
    Ok(())
}
