//! engine::export
//!
//! Project an evaluated pipeline into a flat key/value map.
//!
//! Entries are first filtered (by default, hidden keys are dropped), then
//! optionally re-keyed. Every re-keyed name must satisfy the naming rule;
//! one bad name fails the whole export.
//!
//! When re-keying maps two entries to the same name, the entry whose
//! original key sorts last wins.

use std::collections::BTreeMap;

use super::error::EngineError;
use super::eval::{EvaluatedConfig, EvaluatedPipeline};
use crate::core::naming::validate_naming;

/// Predicate selecting entries to export.
pub type ExportFilter<'a> = Box<dyn Fn(&EvaluatedConfig) -> bool + 'a>;

/// Function deriving an exported key from an entry.
pub type ExportKeys<'a> = Box<dyn Fn(&EvaluatedConfig) -> String + 'a>;

/// Case conversion for exported keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCasing {
    Upper,
    Lower,
}

/// Build a re-keying function that prepends `prefix` and then applies `casing`.
pub fn prefixed_keys<'a>(prefix: &'a str, casing: Option<KeyCasing>) -> ExportKeys<'a> {
    Box::new(move |config: &EvaluatedConfig| {
        let key = format!("{}{}", prefix, config.context.key);
        match casing {
            Some(KeyCasing::Upper) => key.to_uppercase(),
            Some(KeyCasing::Lower) => key.to_lowercase(),
            None => key,
        }
    })
}

/// Export command builder.
///
/// # Example
///
/// ```
/// use cfgsync::engine::eval::EvaluatedPipeline;
/// use cfgsync::engine::export::ExportCommand;
///
/// let pipe = EvaluatedPipeline::new();
/// let exported = ExportCommand::new(&pipe).with_filter(|_| true).execute().unwrap();
/// assert!(exported.is_empty());
/// ```
pub struct ExportCommand<'a> {
    pipe: &'a EvaluatedPipeline,
    filter: Option<ExportFilter<'a>>,
    keys: Option<ExportKeys<'a>>,
}

impl<'a> ExportCommand<'a> {
    pub fn new(pipe: &'a EvaluatedPipeline) -> Self {
        Self {
            pipe,
            filter: None,
            keys: None,
        }
    }

    /// Replace the default "not hidden" filter.
    pub fn with_filter(mut self, filter: impl Fn(&EvaluatedConfig) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Re-key every exported entry.
    pub fn with_keys(mut self, keys: impl Fn(&EvaluatedConfig) -> String + 'a) -> Self {
        self.keys = Some(Box::new(keys));
        self
    }

    /// Run the export.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Naming`] for the first re-keyed name that
    /// violates the naming rule. No partial output is returned.
    pub fn execute(&self) -> Result<BTreeMap<String, String>, EngineError> {
        let default_filter = |config: &EvaluatedConfig| !config.context.cfgu.hidden;

        let mut exported = BTreeMap::new();
        for (key, config) in self.pipe {
            let keep = match &self.filter {
                Some(filter) => filter(config),
                None => default_filter(config),
            };
            if !keep {
                continue;
            }

            let out_key = match &self.keys {
                Some(keys) => {
                    let mutated = keys(config);
                    if !validate_naming(&mutated) {
                        return Err(EngineError::Naming { key: mutated });
                    }
                    mutated
                }
                None => key.clone(),
            };
            exported.insert(out_key, config.value.clone());
        }

        tracing::debug!(
            input = self.pipe.len(),
            exported = exported.len(),
            "exported pipeline"
        );
        Ok(exported)
    }
}
