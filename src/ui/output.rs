//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::engine::upsert::{ConfigDiff, ConfigDiffAction};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format an export map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON object
    #[default]
    Json,
    /// Single-line JSON object
    CompactJson,
    /// `KEY="value"` lines
    Dotenv,
}

/// Render exported configs in the requested format.
pub fn format_export(
    configs: &BTreeMap<String, String>,
    format: ExportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(configs),
        ExportFormat::CompactJson => serde_json::to_string(configs),
        ExportFormat::Dotenv => Ok(configs
            .iter()
            .map(|(key, value)| format!("{}={}", key, dotenv_quote(value)))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Quote a value for a dotenv file.
fn dotenv_quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}

/// Format a diff as one line per changed key.
///
/// ```text
/// + PORT = "8080"
/// ~ HOST: "a" -> "b"
/// - TOKEN
/// ```
pub fn format_diff(diff: &BTreeMap<String, ConfigDiff>) -> String {
    if diff.is_empty() {
        return "No changes".to_string();
    }

    diff.iter()
        .map(|(key, d)| match d.action {
            ConfigDiffAction::Add => format!("+ {} = {:?}", key, d.next),
            ConfigDiffAction::Update => format!("~ {}: {:?} -> {:?}", key, d.prev, d.next),
            ConfigDiffAction::Delete => format!("- {}", key),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarize a diff as counts per action.
pub fn format_diff_summary(diff: &BTreeMap<String, ConfigDiff>, applied: bool) -> String {
    let count = |action: ConfigDiffAction| diff.values().filter(|d| d.action == action).count();
    let verb = if applied { "applied" } else { "pending" };
    format!(
        "{} added, {} updated, {} deleted ({})",
        count(ConfigDiffAction::Add),
        count(ConfigDiffAction::Update),
        count(ConfigDiffAction::Delete),
        verb
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(prev: &str, next: &str, action: ConfigDiffAction) -> ConfigDiff {
        ConfigDiff {
            prev: prev.into(),
            next: next.into(),
            action,
        }
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn export_formats() {
        let mut configs = BTreeMap::new();
        configs.insert("A".to_string(), "1".to_string());
        configs.insert("B".to_string(), "say \"hi\"\nbye".to_string());

        assert_eq!(
            format_export(&configs, ExportFormat::CompactJson).unwrap(),
            r#"{"A":"1","B":"say \"hi\"\nbye"}"#
        );
        assert_eq!(
            format_export(&configs, ExportFormat::Dotenv).unwrap(),
            "A=\"1\"\nB=\"say \\\"hi\\\"\\nbye\""
        );
        assert!(format_export(&configs, ExportFormat::Json)
            .unwrap()
            .contains("\n  \"A\": \"1\""));
    }

    #[test]
    fn diff_lines() {
        let mut d = BTreeMap::new();
        d.insert("A".to_string(), diff("", "1", ConfigDiffAction::Add));
        d.insert("B".to_string(), diff("x", "y", ConfigDiffAction::Update));
        d.insert("C".to_string(), diff("z", "", ConfigDiffAction::Delete));

        assert_eq!(
            format_diff(&d),
            "+ A = \"1\"\n~ B: \"x\" -> \"y\"\n- C"
        );
        assert_eq!(
            format_diff_summary(&d, false),
            "1 added, 1 updated, 1 deleted (pending)"
        );
    }

    #[test]
    fn empty_diff() {
        assert_eq!(format_diff(&BTreeMap::new()), "No changes");
    }
}
