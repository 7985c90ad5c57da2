//! engine::upsert
//!
//! Diff, validate and apply configs against a store.
//!
//! # Flow
//!
//! 1. `init()` the store
//! 2. With no configs and no pipe: every schema key currently stored in the
//!    set is deleted
//! 3. Otherwise:
//!    - keep pipe entries that came from the store for declared,
//!      non-lazy, non-template keys
//!    - validate every explicit config (nothing is merged or written if one
//!      fails)
//!    - merge, explicit configs overriding the pipe
//!    - fetch current values in one batched `get`
//!    - classify each key as Add, Update or Delete, dropping no-ops
//! 4. Unless dry, write the whole diff in one batched `set` (even when empty)
//!
//! # Example
//!
//! ```
//! use cfgsync::core::schema::ConfigSchema;
//! use cfgsync::core::types::{ConfigRecord, ConfigSet};
//! use cfgsync::engine::upsert::{ConfigDiffAction, UpsertCommand};
//! use cfgsync::store::mock::MockConfigStore;
//!
//! # tokio_test::block_on(async {
//! let schema = ConfigSchema::from_json(
//!     "app",
//!     r#"{ "X": { "type": "String" }, "Y": { "type": "String" } }"#,
//! ).unwrap();
//! let set = ConfigSet::new("dev").unwrap();
//! let store = MockConfigStore::with_records(vec![ConfigRecord::new("dev", "X", "old")]);
//!
//! let output = UpsertCommand::new(&store, &set, &schema)
//!     .with_config("X", "new")
//!     .with_config("Y", "v")
//!     .execute()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(output.diff["X"].action, ConfigDiffAction::Update);
//! assert_eq!(output.diff["Y"].action, ConfigDiffAction::Add);
//! assert_eq!(store.value("dev", "X").as_deref(), Some("new"));
//! # });
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{EngineError, SchemaViolation};
use super::eval::{EvaluatedConfigOrigin, EvaluatedPipeline};
use crate::core::schema::ConfigSchema;
use crate::core::types::{ConfigQuery, ConfigRecord, ConfigSet};
use crate::core::validate::{validate_options, validate_type};
use crate::store::ConfigStore;

/// Classification of a key's state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigDiffAction {
    Add,
    Update,
    Delete,
}

impl ConfigDiffAction {
    /// Classify a transition. Returns `None` when nothing changes.
    pub fn classify(prev: &str, next: &str) -> Option<Self> {
        if prev == next {
            None
        } else if next.is_empty() {
            Some(ConfigDiffAction::Delete)
        } else if !prev.is_empty() {
            Some(ConfigDiffAction::Update)
        } else {
            Some(ConfigDiffAction::Add)
        }
    }
}

impl std::fmt::Display for ConfigDiffAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConfigDiffAction::Add => "add",
            ConfigDiffAction::Update => "update",
            ConfigDiffAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One key's transition. Empty strings mean "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDiff {
    pub prev: String,
    pub next: String,
    pub action: ConfigDiffAction,
}

/// Externally visible store details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    #[serde(rename = "type")]
    pub store_type: String,
}

/// Externally visible set details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSnapshot {
    pub path: String,
    pub hierarchy: Vec<String>,
}

/// Externally visible schema details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    pub name: String,
    pub keys: Vec<String>,
}

/// What an upsert ran against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertContext {
    pub store: StoreSnapshot,
    pub set: SetSnapshot,
    pub schema: SchemaSnapshot,
}

impl UpsertContext {
    fn capture(store: &dyn ConfigStore, set: &ConfigSet, schema: &ConfigSchema) -> Self {
        Self {
            store: StoreSnapshot {
                store_type: store.store_type().to_string(),
            },
            set: SetSnapshot {
                path: set.path().to_string(),
                hierarchy: set.hierarchy(),
            },
            schema: SchemaSnapshot {
                name: schema.name().to_string(),
                keys: schema.keys().map(str::to_string).collect(),
            },
        }
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOutput {
    pub context: UpsertContext,
    /// Changed keys only.
    pub diff: BTreeMap<String, ConfigDiff>,
    /// Whether the diff was written.
    pub applied: bool,
}

/// Upsert command builder.
pub struct UpsertCommand<'a> {
    store: &'a dyn ConfigStore,
    set: &'a ConfigSet,
    schema: &'a ConfigSchema,
    configs: BTreeMap<String, String>,
    pipe: EvaluatedPipeline,
    dry: bool,
}

impl<'a> UpsertCommand<'a> {
    pub fn new(store: &'a dyn ConfigStore, set: &'a ConfigSet, schema: &'a ConfigSchema) -> Self {
        Self {
            store,
            set,
            schema,
            configs: BTreeMap::new(),
            pipe: EvaluatedPipeline::new(),
            dry: false,
        }
    }

    /// Add explicit configs. Later values for the same key replace earlier ones.
    pub fn with_configs<K, V>(mut self, configs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.configs
            .extend(configs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a single explicit config.
    pub fn with_config(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_configs([(key.into(), value.into())])
    }

    /// Use an evaluated pipeline as the base state.
    pub fn with_pipe(mut self, pipe: EvaluatedPipeline) -> Self {
        self.pipe = pipe;
        self
    }

    /// Compute the diff without writing it.
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    /// Run the upsert.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Schema`] / [`EngineError::Constraint`] for the first
    ///   invalid config, before anything is written
    /// - [`EngineError::Store`] for store failures, unchanged
    pub async fn execute(self) -> Result<UpsertOutput, EngineError> {
        self.store.init().await?;

        let diff = if self.configs.is_empty() && self.pipe.is_empty() {
            self.delete_all_diff().await?
        } else {
            self.merge_diff().await?
        };

        let applied = if self.dry {
            tracing::debug!(changes = diff.len(), "dry run, skipping store write");
            false
        } else {
            let records: Vec<ConfigRecord> = diff
                .iter()
                .map(|(key, d)| {
                    ConfigRecord::new(self.set.path(), key.clone(), d.next.clone())
                })
                .collect();
            tracing::info!(
                set = %self.set,
                records = records.len(),
                "writing configs to store"
            );
            self.store.set(&records).await?;
            true
        };

        Ok(UpsertOutput {
            context: UpsertContext::capture(self.store, self.set, self.schema),
            diff,
            applied,
        })
    }

    /// Diff that deletes every stored schema key in the set.
    async fn delete_all_diff(&self) -> Result<BTreeMap<String, ConfigDiff>, EngineError> {
        let keys: Vec<String> = self.schema.keys().map(str::to_string).collect();
        tracing::debug!(keys = keys.len(), "no input, deleting all schema keys");

        let current = self.current_values(&keys).await?;
        Ok(self.classify_all(keys.into_iter().map(|key| {
            let prev = current.get(&key).cloned().unwrap_or_default();
            (key, prev, String::new())
        })))
    }

    /// Diff from explicit configs merged over the pipe.
    async fn merge_diff(&self) -> Result<BTreeMap<String, ConfigDiff>, EngineError> {
        let pipe_configs = self.pipe.iter().filter_map(|(key, evaluated)| {
            let cfgu = self.schema.get(key)?;
            let persisted = !cfgu.is_template()
                && !cfgu.lazy
                && evaluated.origin == EvaluatedConfigOrigin::Store;
            persisted.then(|| (key.clone(), evaluated.value.clone()))
        });

        self.validate_configs()?;

        let mut merged: BTreeMap<String, String> = pipe_configs.collect();
        let from_pipe = merged.len();
        merged.extend(
            self.configs
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        tracing::debug!(
            from_pipe,
            explicit = self.configs.len(),
            merged = merged.len(),
            "merged configs"
        );

        let keys: Vec<String> = merged.keys().cloned().collect();
        let current = self.current_values(&keys).await?;
        Ok(self.classify_all(merged.into_iter().map(|(key, next)| {
            let prev = current.get(&key).cloned().unwrap_or_default();
            (key, prev, next)
        })))
    }

    /// Check every explicit config against the schema.
    fn validate_configs(&self) -> Result<(), EngineError> {
        for (key, value) in &self.configs {
            let schema_error = |violation| EngineError::Schema {
                key: key.clone(),
                violation,
            };

            let cfgu = self
                .schema
                .get(key)
                .ok_or_else(|| schema_error(SchemaViolation::Undeclared))?;

            if value.is_empty() {
                continue;
            }
            if cfgu.lazy {
                return Err(schema_error(SchemaViolation::LazyAssigned));
            }
            if cfgu.is_template() {
                return Err(schema_error(SchemaViolation::TemplateAssigned));
            }

            validate_options(cfgu, value)
                .and_then(|()| validate_type(cfgu, value))
                .map_err(|reason| EngineError::Constraint {
                    key: key.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Current values for `keys` in the target set, from one batched `get`.
    async fn current_values(
        &self,
        keys: &[String],
    ) -> Result<BTreeMap<String, String>, EngineError> {
        let queries: Vec<ConfigQuery> = keys
            .iter()
            .map(|key| ConfigQuery::new(self.set.path(), key.clone()))
            .collect();

        Ok(self
            .store
            .get(&queries)
            .await?
            .into_iter()
            .filter(|r| r.set == self.set.path())
            .map(|r| (r.key, r.value))
            .collect())
    }

    fn classify_all(
        &self,
        transitions: impl Iterator<Item = (String, String, String)>,
    ) -> BTreeMap<String, ConfigDiff> {
        transitions
            .filter_map(|(key, prev, next)| {
                let action = ConfigDiffAction::classify(&prev, &next)?;
                Some((key, ConfigDiff { prev, next, action }))
            })
            .collect()
    }
}
