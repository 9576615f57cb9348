//! `buildcfg resolve` — materialize a variant's configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use buildcfg_core::{render, BuildVariant, ConfigMaterializer, OutputFormat};
use clap::Args;

use super::write_output;
use crate::config::{load_static_params, ResolvedPaths};

#[derive(Args)]
pub struct ResolveArgs {
    /// Build variant (release or debug)
    #[arg(long, default_value = "release")]
    pub variant: BuildVariant,

    /// Output format (json, yaml or properties)
    #[arg(long, short, default_value = "json")]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn handle_resolve_command(paths: &ResolvedPaths, args: ResolveArgs) -> Result<()> {
    let params = load_static_params(paths)?;
    let materializer = ConfigMaterializer::new(&paths.properties, params);

    let resolved = materializer
        .materialize(args.variant)
        .with_context(|| format!("Failed to resolve {} configuration", args.variant))?;

    let rendered = render(&resolved, args.format)?;
    write_output(args.output.as_deref(), &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> ResolvedPaths {
        ResolvedPaths {
            project_dir: dir.path().to_path_buf(),
            properties: dir.path().join("key.properties"),
            params: None,
        }
    }

    #[test]
    fn test_resolve_debug_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out/debug.json");

        handle_resolve_command(
            &paths_in(&dir),
            ResolveArgs {
                variant: BuildVariant::Debug,
                format: OutputFormat::Json,
                output: Some(out.clone()),
            },
        )
        .unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.contains("com.joyscroll.app.debug"));
    }

    #[test]
    fn test_resolve_release_without_properties_fails() {
        let dir = TempDir::new().unwrap();
        let err = handle_resolve_command(
            &paths_in(&dir),
            ResolveArgs {
                variant: BuildVariant::Release,
                format: OutputFormat::Json,
                output: Some(dir.path().join("release.json")),
            },
        )
        .unwrap_err();

        let root = err.root_cause().to_string();
        assert!(root.contains("Missing signing key"));
        assert!(!dir.path().join("release.json").exists());
    }
}
