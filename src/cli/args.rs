//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--config <file>`: Use this global config file
//! - `--store <provider>` / `--store-path <file>`: Override the configured store

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::export::KeyCasing;
use crate::ui::output::ExportFormat;

/// cfgsync - Schema-driven config reconciliation
#[derive(Parser, Debug)]
#[command(name = "cfgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if cfgsync was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Global config file (overrides $CFGSYNC_CONFIG and default locations)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store provider (json-file, memory)
    #[arg(long, global = true, value_name = "PROVIDER")]
    pub store: Option<String>,

    /// Backing file for the json-file store
    #[arg(long, global = true, value_name = "FILE")]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a schema against the store and print the pipeline as JSON
    #[command(
        name = "eval",
        long_about = "Evaluate a schema against the store and print the pipeline as JSON.\n\n\
            Each declared key resolves to its stored value in the set, else its \
            declared default, else empty. The output can be passed to `upsert --pipe` \
            or `export --pipe`.",
        after_help = "\
EXAMPLES:
    cfgsync eval --schema app.cfgu.json --set dev
    cfgsync eval --schema app.cfgu.json --set dev > pipe.json"
    )]
    Eval {
        /// Schema file (<name>.cfgu.json)
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Set path ("/" for root)
        #[arg(long, value_name = "PATH")]
        set: Option<String>,
    },

    /// Diff configs against the store and apply the changes
    #[command(
        name = "upsert",
        long_about = "Diff configs against the store and apply the changes.\n\n\
            Explicit -c values override values from --pipe. Every value is validated \
            against the schema before anything is written. An empty value deletes \
            the key.\n\n\
            With neither -c nor --pipe, every schema key stored in the set is deleted.",
        after_help = "\
EXAMPLES:
    # Preview a change
    cfgsync upsert --schema app.cfgu.json --set dev -c PORT=8080 --dry-run

    # Apply it
    cfgsync upsert --schema app.cfgu.json --set dev -c PORT=8080

    # Copy stored values from one set to another
    cfgsync eval --schema app.cfgu.json --set dev | \\
        cfgsync upsert --schema app.cfgu.json --set staging --pipe -"
    )]
    Upsert {
        /// Schema file (<name>.cfgu.json)
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Set path ("/" for root)
        #[arg(long, value_name = "PATH")]
        set: Option<String>,

        /// Config to write; an empty value deletes the key
        #[arg(
            short = 'c',
            long = "configs",
            value_name = "KEY=VALUE",
            value_parser = parse_key_value
        )]
        configs: Vec<(String, String)>,

        /// Evaluated pipeline JSON file, or "-" for stdin
        #[arg(long, value_name = "FILE")]
        pipe: Option<String>,

        /// Compute the diff without writing it
        #[arg(long)]
        dry_run: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export evaluated configs as JSON or dotenv
    #[command(
        name = "export",
        long_about = "Export evaluated configs as JSON or dotenv.\n\n\
            Keys declared hidden are left out unless --all is given. --prefix and \
            --casing rename exported keys; every resulting name must still be a \
            valid key name.",
        after_help = "\
EXAMPLES:
    cfgsync export --schema app.cfgu.json --set prod --format dotenv
    cfgsync export --pipe pipe.json --prefix APP_ --casing upper"
    )]
    Export {
        /// Evaluated pipeline JSON file, or "-" for stdin
        #[arg(long, value_name = "FILE", conflicts_with_all = ["schema", "set"])]
        pipe: Option<String>,

        /// Schema file to evaluate (when not using --pipe)
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Set path to evaluate (when not using --pipe)
        #[arg(long, value_name = "PATH")]
        set: Option<String>,

        /// Include hidden keys
        #[arg(long)]
        all: bool,

        /// Prefix for exported keys
        #[arg(long)]
        prefix: Option<String>,

        /// Case conversion for exported keys
        #[arg(long, value_enum)]
        casing: Option<CasingArg>,

        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    cfgsync completion bash > ~/.local/share/bash-completion/completions/cfgsync
    cfgsync completion zsh > ~/.zfunc/_cfgsync"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a `KEY=VALUE` pair. The value may be empty or contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing key in '{}'", s)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Key casing for exports
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasingArg {
    /// UPPER_CASE keys
    Upper,
    /// lower_case keys
    Lower,
}

impl From<CasingArg> for KeyCasing {
    fn from(arg: CasingArg) -> Self {
        match arg {
            CasingArg::Upper => KeyCasing::Upper,
            CasingArg::Lower => KeyCasing::Lower,
        }
    }
}

/// Export output format
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    CompactJson,
    /// KEY="value" lines
    Dotenv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::CompactJson => ExportFormat::CompactJson,
            FormatArg::Dotenv => ExportFormat::Dotenv,
        }
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("A=1"),
            Ok(("A".to_string(), "1".to_string()))
        );
        assert_eq!(
            parse_key_value("URL=a=b"),
            Ok(("URL".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_key_value("A="), Ok(("A".to_string(), String::new())));
        assert!(parse_key_value("A").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn parse_upsert() {
        let cli = Cli::try_parse_from([
            "cfgsync", "upsert", "--schema", "app.cfgu.json", "--set", "dev", "-c", "A=1",
            "-c", "B=", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Upsert {
                configs, dry_run, ..
            } => {
                assert_eq!(configs.len(), 2);
                assert_eq!(configs[1], ("B".to_string(), String::new()));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn export_pipe_conflicts_with_schema() {
        let result = Cli::try_parse_from([
            "cfgsync", "export", "--pipe", "p.json", "--schema", "app.cfgu.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn export_format_names() {
        let cli = Cli::try_parse_from([
            "cfgsync",
            "export",
            "--pipe",
            "-",
            "--format",
            "compact-json",
        ])
        .unwrap();
        match cli.command {
            Command::Export { format, .. } => assert_eq!(format, FormatArg::CompactJson),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cfgsync", "eval", "--store", "memory", "--debug"]).unwrap();
        assert_eq!(cli.store.as_deref(), Some("memory"));
        assert!(cli.debug);
    }
}
