//! core::schema
//!
//! Declared configuration contracts.
//!
//! # Overview
//!
//! A [`ConfigSchema`] maps key names to [`Cfgu`] declarations. The schema
//! defines the universe of valid keys for a set: anything not declared
//! cannot be written.
//!
//! # File Format
//!
//! Schemas are JSON files named `<name>.cfgu.json`:
//!
//! ```json
//! {
//!   "DATABASE_URL": { "type": "URL", "required": true },
//!   "LOG_LEVEL": { "type": "String", "options": ["debug", "info"], "default": "info" },
//!   "API_TOKEN": { "type": "String", "hidden": true }
//! }
//! ```
//!
//! # Validation
//!
//! Declarations are checked when the schema is built, so a `ConfigSchema`
//! in hand is always internally consistent.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming::{validate_naming, NAMING_ERROR_MESSAGE};
use super::validate::{compile_pattern, validate_options, validate_type};

/// File suffix for schema files.
pub const SCHEMA_FILE_SUFFIX: &str = ".cfgu.json";

/// Errors from schema loading and declaration checks.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse schema \"{name}\": {message}")]
    ParseError { name: String, message: String },

    #[error("invalid schema name \"{name}\": {message}")]
    InvalidName { name: String, message: &'static str },

    #[error("schema \"{name}\" declares no keys")]
    Empty { name: String },

    #[error("invalid declaration for key \"{key}\" in schema \"{schema}\": {reason}")]
    InvalidKey {
        schema: String,
        key: String,
        reason: String,
    },
}

/// Value types a key can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CfguType {
    Boolean,
    Number,
    String,
    RegEx,
    #[serde(rename = "UUID")]
    Uuid,
    SemVer,
    Email,
    #[serde(rename = "URL")]
    Url,
    IPv4,
    IPv6,
    Domain,
    Hex,
    Base64,
    AlphaNumeric,
    DateTime,
    #[serde(rename = "JSON")]
    Json,
}

impl CfguType {
    /// Name as written in schema files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CfguType::Boolean => "Boolean",
            CfguType::Number => "Number",
            CfguType::String => "String",
            CfguType::RegEx => "RegEx",
            CfguType::Uuid => "UUID",
            CfguType::SemVer => "SemVer",
            CfguType::Email => "Email",
            CfguType::Url => "URL",
            CfguType::IPv4 => "IPv4",
            CfguType::IPv6 => "IPv6",
            CfguType::Domain => "Domain",
            CfguType::Hex => "Hex",
            CfguType::Base64 => "Base64",
            CfguType::AlphaNumeric => "AlphaNumeric",
            CfguType::DateTime => "DateTime",
            CfguType::Json => "JSON",
        }
    }
}

impl std::fmt::Display for CfguType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A key's `template` declaration: either a flag or the template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CfguTemplate {
    Flag(bool),
    Text(String),
}

impl CfguTemplate {
    /// `true` for `Flag(true)` or non-empty text.
    pub fn is_set(&self) -> bool {
        match self {
            CfguTemplate::Flag(flag) => *flag,
            CfguTemplate::Text(text) => !text.is_empty(),
        }
    }
}

/// Declared contract for a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Cfgu {
    /// Value type.
    #[serde(rename = "type")]
    pub cfgu_type: CfguType,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pattern for `RegEx` typed keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Allowed values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Value used when nothing is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// A value must be present at evaluation time.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    /// Keys this key depends on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Vec<String>>,

    /// Template flag or text; templated keys are computed, never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CfguTemplate>,

    /// Value is supplied only at evaluation time, never stored.
    #[serde(default, skip_serializing_if = "is_false")]
    pub lazy: bool,

    /// Excluded from exports by default.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl Cfgu {
    /// A plain declaration of the given type with every flag off.
    pub fn new(cfgu_type: CfguType) -> Self {
        Self {
            cfgu_type,
            description: None,
            pattern: None,
            options: None,
            default: None,
            required: false,
            depends: None,
            template: None,
            lazy: false,
            hidden: false,
        }
    }

    /// Whether the key is computed from a template.
    pub fn is_template(&self) -> bool {
        self.template.as_ref().is_some_and(CfguTemplate::is_set)
    }

    /// Check this declaration for internal consistency.
    fn check(&self) -> Result<(), String> {
        if self.cfgu_type == CfguType::RegEx {
            let pattern = self
                .pattern
                .as_deref()
                .ok_or_else(|| "type \"RegEx\" requires a pattern".to_string())?;
            compile_pattern(pattern).map_err(|e| e.to_string())?;
        } else if self.pattern.is_some() {
            return Err(format!(
                "pattern is only allowed with type \"RegEx\", not \"{}\"",
                self.cfgu_type
            ));
        }

        if let Some(options) = &self.options {
            if options.is_empty() {
                return Err("options cannot be empty".to_string());
            }
            let mut seen = HashSet::new();
            for option in options {
                if option.is_empty() {
                    return Err("options cannot contain an empty value".to_string());
                }
                if !seen.insert(option.as_str()) {
                    return Err(format!("options contain duplicate value \"{}\"", option));
                }
                validate_type(self, option).map_err(|e| format!("invalid option: {}", e))?;
            }
        }

        if let Some(default) = &self.default {
            if self.required {
                return Err("default cannot be set on a required key".to_string());
            }
            if self.is_template() {
                return Err("default cannot be set on a template key".to_string());
            }
            if self.lazy {
                return Err("default cannot be set on a lazy key".to_string());
            }
            validate_type(self, default).map_err(|e| format!("invalid default: {}", e))?;
            validate_options(self, default).map_err(|e| format!("invalid default: {}", e))?;
        }

        if self.lazy && self.is_template() {
            return Err("a key cannot be both lazy and a template".to_string());
        }

        Ok(())
    }
}

/// A named mapping from key to [`Cfgu`].
///
/// Keys iterate in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSchema {
    name: String,
    contents: BTreeMap<String, Cfgu>,
}

impl ConfigSchema {
    /// Build a schema, checking the name and every declaration.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] naming the first offending key.
    pub fn new(
        name: impl Into<String>,
        contents: BTreeMap<String, Cfgu>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if !validate_naming(&name) {
            return Err(SchemaError::InvalidName {
                name,
                message: NAMING_ERROR_MESSAGE,
            });
        }
        if contents.is_empty() {
            return Err(SchemaError::Empty { name });
        }

        for (key, cfgu) in &contents {
            let invalid = |reason: String| SchemaError::InvalidKey {
                schema: name.clone(),
                key: key.clone(),
                reason,
            };

            if !validate_naming(key) {
                return Err(invalid(format!("key {}", NAMING_ERROR_MESSAGE)));
            }
            cfgu.check().map_err(invalid)?;

            if let Some(depends) = &cfgu.depends {
                if depends.is_empty() {
                    return Err(invalid("depends cannot be empty".to_string()));
                }
                if let Some(missing) = depends.iter().find(|d| !contents.contains_key(*d)) {
                    return Err(invalid(format!(
                        "depends on undeclared key \"{}\"",
                        missing
                    )));
                }
            }
        }

        Ok(Self { name, contents })
    }

    /// Parse a schema from JSON text.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, SchemaError> {
        let name = name.into();
        let contents: BTreeMap<String, Cfgu> =
            serde_json::from_str(json).map_err(|e| SchemaError::ParseError {
                name: name.clone(),
                message: e.to_string(),
            })?;
        Self::new(name, contents)
    }

    /// Load a schema file. The name is the file name without `.cfgu.json`.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path).map_err(|e| SchemaError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(Self::name_from_path(path), &contents)
    }

    /// Derive a schema name from a file path.
    pub fn name_from_path(path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        file_name
            .strip_suffix(SCHEMA_FILE_SUFFIX)
            .or_else(|| file_name.strip_suffix(".json"))
            .unwrap_or(&file_name)
            .to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &BTreeMap<String, Cfgu> {
        &self.contents
    }

    /// Look up a key's declaration.
    pub fn get(&self, key: &str) -> Option<&Cfgu> {
        self.contents.get(key)
    }

    /// Declared keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Result<ConfigSchema, SchemaError> {
        ConfigSchema::from_json("app", json)
    }

    fn reason(err: SchemaError) -> String {
        match err {
            SchemaError::InvalidKey { reason, .. } => reason,
            other => panic!("expected InvalidKey, got {:?}", other),
        }
    }

    #[test]
    fn parses_full_declaration() {
        let s = schema(
            r#"{
                "A": { "type": "String", "description": "plain" },
                "B": { "type": "Number", "hidden": true, "default": "3" },
                "C": { "type": "RegEx", "pattern": "^x+$", "lazy": true },
                "D": { "type": "String", "template": "{{A}}-suffix", "depends": ["A"] },
                "E": { "type": "String", "options": ["a", "b"], "required": true }
            }"#,
        )
        .expect("valid schema");

        assert_eq!(s.name(), "app");
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["A", "B", "C", "D", "E"]);
        assert!(s.get("B").unwrap().hidden);
        assert!(s.get("C").unwrap().lazy);
        assert!(s.get("D").unwrap().is_template());
        assert!(s.get("E").unwrap().required);
    }

    #[test]
    fn type_names_match_file_format() {
        let s = schema(
            r#"{ "U": { "type": "UUID" }, "J": { "type": "JSON" }, "L": { "type": "URL" } }"#,
        )
        .unwrap();
        assert_eq!(s.get("U").unwrap().cfgu_type, CfguType::Uuid);
        assert_eq!(s.get("J").unwrap().cfgu_type, CfguType::Json);
        assert_eq!(s.get("L").unwrap().cfgu_type.to_string(), "URL");
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = schema(r#"{ "A": { "type": "String", "secret": true } }"#).unwrap_err();
        assert!(matches!(err, SchemaError::ParseError { .. }));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(schema(r#"{ "A": { "type": "Integer" } }"#).is_err());
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(matches!(schema("{}"), Err(SchemaError::Empty { .. })));
    }

    #[test]
    fn rejects_bad_key_name() {
        let err = schema(r#"{ "bad key": { "type": "String" } }"#).unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn rejects_bad_schema_name() {
        let err = ConfigSchema::from_json("my schema", r#"{ "A": { "type": "String" } }"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName { .. }));
    }

    #[test]
    fn regex_requires_valid_pattern() {
        assert!(reason(schema(r#"{ "A": { "type": "RegEx" } }"#).unwrap_err()).contains("pattern"));
        assert!(schema(r#"{ "A": { "type": "RegEx", "pattern": "(" } }"#).is_err());
        assert!(
            reason(schema(r#"{ "A": { "type": "String", "pattern": "x" } }"#).unwrap_err())
                .contains("only allowed")
        );
    }

    #[test]
    fn options_checked() {
        assert!(schema(r#"{ "A": { "type": "String", "options": [] } }"#).is_err());
        assert!(schema(r#"{ "A": { "type": "String", "options": ["a", "a"] } }"#).is_err());
        assert!(schema(r#"{ "A": { "type": "Number", "options": ["1", "two"] } }"#).is_err());
    }

    #[test]
    fn default_conflicts() {
        let conflicts = [
            r#"{ "A": { "type": "String", "default": "x", "required": true } }"#,
            r#"{ "A": { "type": "String", "default": "x", "template": "t" } }"#,
            r#"{ "A": { "type": "String", "default": "x", "lazy": true } }"#,
            r#"{ "A": { "type": "Number", "default": "x" } }"#,
            r#"{ "A": { "type": "String", "default": "c", "options": ["a", "b"] } }"#,
        ];
        for json in conflicts {
            assert!(schema(json).is_err(), "should reject {json}");
        }
    }

    #[test]
    fn lazy_template_conflict() {
        let err = schema(r#"{ "A": { "type": "String", "lazy": true, "template": "t" } }"#)
            .unwrap_err();
        assert!(reason(err).contains("lazy"));
    }

    #[test]
    fn depends_must_be_declared() {
        let err = schema(r#"{ "A": { "type": "String", "depends": ["B"] } }"#).unwrap_err();
        assert!(reason(err).contains("\"B\""));
    }

    #[test]
    fn empty_template_is_not_template() {
        let mut cfgu = Cfgu::new(CfguType::String);
        cfgu.template = Some(CfguTemplate::Text(String::new()));
        assert!(!cfgu.is_template());
    }

    #[test]
    fn template_accepts_flag_or_text() {
        let s = schema(
            r#"{
                "A": { "type": "String", "template": true },
                "B": { "type": "String", "template": false },
                "C": { "type": "String", "template": "{{A}}" }
            }"#,
        )
        .expect("valid schema");

        assert_eq!(s.get("A").unwrap().template, Some(CfguTemplate::Flag(true)));
        assert!(s.get("A").unwrap().is_template());
        assert!(!s.get("B").unwrap().is_template());
        assert!(s.get("C").unwrap().is_template());
    }

    #[test]
    fn template_flag_conflicts_like_text() {
        let err = schema(r#"{ "A": { "type": "String", "lazy": true, "template": true } }"#)
            .unwrap_err();
        assert!(reason(err).contains("lazy"));
        assert!(
            schema(r#"{ "A": { "type": "String", "default": "x", "template": true } }"#).is_err()
        );
    }

    #[test]
    fn name_from_path() {
        assert_eq!(ConfigSchema::name_from_path(Path::new("dir/app.cfgu.json")), "app");
        assert_eq!(ConfigSchema::name_from_path(Path::new("other.json")), "other");
    }

    #[test]
    fn from_file_missing() {
        let err = ConfigSchema::from_file(Path::new("/nonexistent/x.cfgu.json")).unwrap_err();
        assert!(matches!(err, SchemaError::ReadError { .. }));
    }
}
