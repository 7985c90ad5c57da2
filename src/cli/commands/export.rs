//! cli::commands::export
//!
//! Export evaluated configs for consumption by other tools.
//!
//! # Example
//!
//! ```bash
//! cfgsync export --schema app.cfgu.json --set prod --format dotenv > .env
//! cfgsync eval --schema app.cfgu.json --set prod | cfgsync export --pipe - --all
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};

use super::common;
use crate::engine::eval::{evaluate_from_store, EvaluatedPipeline};
use crate::engine::export::{prefixed_keys, ExportCommand, KeyCasing};
use crate::engine::Context;
use crate::ui::output::{self, ExportFormat};

/// Arguments for the export command.
#[derive(Debug, Default)]
pub struct ExportArgs<'a> {
    pub pipe: Option<&'a str>,
    pub schema: Option<&'a Path>,
    pub set: Option<&'a str>,
    pub all: bool,
    pub prefix: Option<&'a str>,
    pub casing: Option<KeyCasing>,
    pub format: ExportFormat,
}

/// Run the export command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn export(ctx: &Context, args: ExportArgs<'_>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let pipe = rt.block_on(load_pipe(ctx, &args))?;

    let mut command = ExportCommand::new(&pipe);
    if args.all {
        command = command.with_filter(|_| true);
    }
    if args.prefix.is_some() || args.casing.is_some() {
        command = command.with_keys(prefixed_keys(args.prefix.unwrap_or(""), args.casing));
    }

    let exported = command.execute()?;
    let rendered = output::format_export(&exported, args.format)
        .context("failed to render export")?;
    println!("{}", rendered);
    Ok(())
}

/// Read the pipe, or evaluate one from the store.
async fn load_pipe(ctx: &Context, args: &ExportArgs<'_>) -> Result<EvaluatedPipeline> {
    if let Some(source) = args.pipe {
        return common::read_pipe(ctx, source);
    }

    let config = common::load_config(ctx)?;
    let schema = common::load_schema(ctx, &config, args.schema)?;
    let set = common::resolve_set(&config, args.set)?;
    let store = common::open_store(ctx, &config)?;

    evaluate_from_store(store.as_ref(), &set, &schema)
        .await
        .context("evaluation failed")
}
