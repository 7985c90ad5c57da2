//! engine::eval
//!
//! Evaluated pipeline data model, and a loader that builds one straight
//! from a store.
//!
//! # Pipeline
//!
//! An [`EvaluatedPipeline`] maps each key to its resolved value plus
//! provenance ([`EvaluatedConfigOrigin`]) and the context it was resolved
//! in. Pipelines serialize as JSON so they can be passed between commands:
//!
//! ```text
//! cfgsync eval --schema app.cfgu.json --set dev > pipe.json
//! cfgsync export --pipe pipe.json --format dotenv
//! ```
//!
//! # Store Loader
//!
//! [`evaluate_from_store`] resolves each schema key from the exact set only:
//! a stored value wins, then the declared default, else the key is empty.
//! Template rendering and inheritance from parent sets are not performed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use crate::core::schema::{Cfgu, ConfigSchema};
use crate::core::types::{ConfigQuery, ConfigSet};
use crate::store::ConfigStore;

/// Where an evaluated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatedConfigOrigin {
    /// Supplied explicitly by the caller.
    Override,
    /// Read from the store.
    Store,
    /// Rendered from the key's template.
    Template,
    /// The key's declared default.
    Default,
    /// No value.
    Empty,
}

/// Context a value was evaluated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Store provider name.
    pub store: String,
    /// Set path (empty for root).
    pub set: String,
    /// Schema name.
    pub schema: String,
    pub key: String,
    pub cfgu: Cfgu,
}

/// One resolved value plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedConfig {
    pub value: String,
    pub origin: EvaluatedConfigOrigin,
    pub context: EvaluationContext,
}

/// Mapping from key to its evaluated config.
pub type EvaluatedPipeline = BTreeMap<String, EvaluatedConfig>;

/// Build a pipeline for every key in `schema` from the values stored in `set`.
///
/// Issues a single batched `get`.
///
/// # Errors
///
/// Store failures propagate as [`EngineError::Store`].
pub async fn evaluate_from_store(
    store: &dyn ConfigStore,
    set: &ConfigSet,
    schema: &ConfigSchema,
) -> Result<EvaluatedPipeline, EngineError> {
    let queries: Vec<ConfigQuery> = schema
        .keys()
        .map(|key| ConfigQuery::new(set.path(), key))
        .collect();

    let stored: BTreeMap<String, String> = store
        .get(&queries)
        .await?
        .into_iter()
        .filter(|r| r.set == set.path() && !r.value.is_empty())
        .map(|r| (r.key, r.value))
        .collect();

    tracing::debug!(
        schema = schema.name(),
        set = %set,
        keys = queries.len(),
        stored = stored.len(),
        "evaluated pipeline from store"
    );

    let pipeline = schema
        .contents()
        .iter()
        .map(|(key, cfgu)| {
            let (value, origin) = match (stored.get(key), &cfgu.default) {
                (Some(value), _) => (value.clone(), EvaluatedConfigOrigin::Store),
                (None, Some(default)) => (default.clone(), EvaluatedConfigOrigin::Default),
                (None, None) => (String::new(), EvaluatedConfigOrigin::Empty),
            };
            let context = EvaluationContext {
                store: store.store_type().to_string(),
                set: set.path().to_string(),
                schema: schema.name().to_string(),
                key: key.clone(),
                cfgu: cfgu.clone(),
            };
            (
                key.clone(),
                EvaluatedConfig {
                    value,
                    origin,
                    context,
                },
            )
        })
        .collect();

    Ok(pipeline)
}
