//! cli::commands::eval
//!
//! Evaluate a schema against the store and print the pipeline.
//!
//! # Example
//!
//! ```bash
//! cfgsync eval --schema app.cfgu.json --set dev > pipe.json
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};

use super::common;
use crate::engine::eval::evaluate_from_store;
use crate::engine::Context;

/// Run the eval command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn eval(ctx: &Context, schema: Option<&Path>, set: Option<&str>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(eval_async(ctx, schema, set))
}

async fn eval_async(ctx: &Context, schema: Option<&Path>, set: Option<&str>) -> Result<()> {
    let config = common::load_config(ctx)?;
    let schema = common::load_schema(ctx, &config, schema)?;
    let set = common::resolve_set(&config, set)?;
    let store = common::open_store(ctx, &config)?;

    let pipe = evaluate_from_store(store.as_ref(), &set, &schema)
        .await
        .context("evaluation failed")?;

    // The pipeline is data, so it is printed even in quiet mode.
    println!("{}", serde_json::to_string_pretty(&pipe)?);
    Ok(())
}
