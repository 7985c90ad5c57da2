//! cli::commands::common
//!
//! Shared resolution of tool config, store, schema, set and pipe input.
//!
//! CLI flags win over project config, which wins over global config.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use crate::core::config::{Config, StoreSettings};
use crate::core::schema::ConfigSchema;
use crate::core::types::ConfigSet;
use crate::engine::eval::EvaluatedPipeline;
use crate::engine::Context;
use crate::store::{create_store, ConfigStore};

/// Working directory for this invocation.
pub fn cwd(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

/// Load tool configuration for this invocation.
pub fn load_config(ctx: &Context) -> Result<Config> {
    let cwd = cwd(ctx)?;
    let result = match &ctx.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file '{}' does not exist", path.display());
            }
            Config::load_from(Some(path), Some(&cwd))
        }
        None => Config::load(Some(&cwd)),
    }
    .context("failed to load configuration")?;

    let config = result.config;
    if let Some(path) = config.global_config_loaded_from() {
        tracing::debug!(path = %path.display(), "loaded global config");
    }
    if let Some(path) = config.project_config_loaded_from() {
        tracing::debug!(path = %path.display(), "loaded project config");
    }
    Ok(config)
}

/// Open the store selected by flags and configuration.
pub fn open_store(ctx: &Context, config: &Config) -> Result<Box<dyn ConfigStore>> {
    let cwd = cwd(ctx)?;
    let settings = StoreSettings {
        provider: Some(
            ctx.store
                .clone()
                .unwrap_or_else(|| config.store_provider().to_string()),
        ),
        path: ctx
            .store_path
            .clone()
            .or_else(|| config.store_path().map(Path::to_path_buf))
            .map(|p| cwd.join(p)),
    };
    settings.validate()?;

    let store = create_store(&settings)?;
    tracing::debug!(store = store.store_type(), "opened store");
    Ok(store)
}

/// Load the schema from the flag, else from project config.
pub fn load_schema(ctx: &Context, config: &Config, arg: Option<&Path>) -> Result<ConfigSchema> {
    let path = match arg.or_else(|| config.schema_path()) {
        Some(path) => cwd(ctx)?.join(path),
        None => bail!("no schema given; pass --schema or set `schema` in .cfgsync/config.toml"),
    };

    ConfigSchema::from_file(&path)
        .with_context(|| format!("failed to load schema '{}'", path.display()))
}

/// Resolve the set from the flag, else from project config.
pub fn resolve_set(config: &Config, arg: Option<&str>) -> Result<ConfigSet> {
    let raw = match arg.or_else(|| config.default_set()) {
        Some(raw) => raw,
        None => bail!(
            "no set given; pass --set (\"/\" for root) or set `set` in .cfgsync/config.toml"
        ),
    };
    Ok(ConfigSet::new(raw)?)
}

/// Read an evaluated pipeline from a file, or stdin when `source` is "-".
pub fn read_pipe(ctx: &Context, source: &str) -> Result<EvaluatedPipeline> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read pipe from stdin")?;
        buf
    } else {
        let path = cwd(ctx)?.join(source);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read pipe '{}'", path.display()))?
    };

    if content.trim().is_empty() {
        return Ok(EvaluatedPipeline::new());
    }
    serde_json::from_str(&content).context("pipe is not a valid evaluated pipeline")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProjectConfig;
    use tempfile::TempDir;

    fn ctx_in(dir: &Path) -> Context {
        Context {
            cwd: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn set_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let project = ProjectConfig {
            set: Some("dev".into()),
            ..Default::default()
        };
        Config::write_project(temp.path(), &project).unwrap();
        let config = Config::load_from(None, Some(temp.path())).unwrap().config;

        assert_eq!(resolve_set(&config, Some("prod")).unwrap().path(), "prod");
        assert_eq!(resolve_set(&config, None).unwrap().path(), "dev");
        assert!(resolve_set(&Config::default(), None).is_err());
        assert!(resolve_set(&Config::default(), Some("/")).unwrap().is_root());
    }

    #[test]
    fn schema_resolved_relative_to_cwd() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("app.cfgu.json"),
            r#"{ "A": { "type": "String" } }"#,
        )
        .unwrap();
        let ctx = ctx_in(temp.path());

        let schema =
            load_schema(&ctx, &Config::default(), Some(Path::new("app.cfgu.json"))).unwrap();
        assert_eq!(schema.name(), "app");
        assert!(load_schema(&ctx, &Config::default(), None).is_err());
    }

    #[test]
    fn store_flags_override_config() {
        let temp = TempDir::new().unwrap();
        let ctx = Context {
            store: Some("memory".into()),
            ..ctx_in(temp.path())
        };
        let store = open_store(&ctx, &Config::default()).unwrap();
        assert_eq!(store.store_type(), "memory");

        let bad = Context {
            store: Some("redis".into()),
            ..ctx_in(temp.path())
        };
        assert!(open_store(&bad, &Config::default()).is_err());
    }

    #[test]
    fn empty_pipe_file_is_empty_pipeline() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("pipe.json"), "\n").unwrap();
        let pipe = read_pipe(&ctx_in(temp.path()), "pipe.json").unwrap();
        assert!(pipe.is_empty());
    }
}
