//! `buildcfg params` — inspect and scaffold the static parameter table.

use std::path::PathBuf;

use anyhow::{bail, Result};
use buildcfg_core::params::{render_params, ParamsFormat};
use buildcfg_core::StaticParams;
use clap::Subcommand;

use super::write_output;
use crate::config::{load_static_params, ResolvedPaths};

#[derive(Subcommand)]
pub enum ParamsCommands {
    /// Write a params file with the built-in defaults
    Init {
        /// File to create (defaults to buildcfg.yaml or buildcfg.huml in the project dir)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// File format (yaml or huml)
        #[arg(long, short, default_value = "yaml")]
        format: ParamsFormat,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective params
    Show {
        /// Output format (yaml or huml)
        #[arg(long, short, default_value = "yaml")]
        format: ParamsFormat,
    },
}

pub fn handle_params_command(paths: &ResolvedPaths, cmd: ParamsCommands) -> Result<()> {
    match cmd {
        ParamsCommands::Init {
            output,
            format,
            force,
        } => {
            // A configured params file that does not exist yet is the init target.
            let path = output
                .map(|p| paths.project_dir.join(p))
                .or_else(|| paths.params.clone().filter(|p| !p.exists()))
                .unwrap_or_else(|| paths.project_dir.join(format!("buildcfg.{}", format)));

            if path.exists() && !force {
                bail!(
                    "{} already exists. Use --force to overwrite.",
                    path.display()
                );
            }

            let content = render_params(&StaticParams::default(), format)?;
            write_output(Some(&path), &content)?;
            println!("Created {}", path.display());
        }
        ParamsCommands::Show { format } => {
            let params = load_static_params(paths)?;
            match &paths.params {
                Some(path) => tracing::info!("Params from {}", path.display()),
                None => tracing::info!("Params from built-in defaults"),
            }
            write_output(None, &render_params(&params, format)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildcfg_core::load_params;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> ResolvedPaths {
        ResolvedPaths {
            project_dir: dir.path().to_path_buf(),
            properties: dir.path().join("android/key.properties"),
            params: None,
        }
    }

    #[test]
    fn test_init_writes_loadable_yaml() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);

        handle_params_command(
            &paths,
            ParamsCommands::Init {
                output: None,
                format: ParamsFormat::Yaml,
                force: false,
            },
        )
        .unwrap();

        let params = load_params(&dir.path().join("buildcfg.yaml")).unwrap();
        assert_eq!(params, StaticParams::default());
    }

    #[test]
    fn test_init_creates_missing_configured_params_file() {
        let dir = TempDir::new().unwrap();
        let paths = crate::config::resolve_paths(
            dir.path(),
            None,
            Some(std::path::Path::new("ci/params.huml")),
        );

        handle_params_command(
            &paths,
            ParamsCommands::Init {
                output: None,
                format: ParamsFormat::Huml,
                force: false,
            },
        )
        .unwrap();

        let params = load_params(&dir.path().join("ci/params.huml")).unwrap();
        assert_eq!(params, StaticParams::default());
        assert!(!dir.path().join("buildcfg.huml").exists());
    }

    #[test]
    fn test_show_fails_for_missing_configured_params_file() {
        let dir = TempDir::new().unwrap();
        let mut paths = paths_in(&dir);
        paths.params = Some(dir.path().join("missing.yaml"));

        let err = handle_params_command(&paths, ParamsCommands::Show { format: ParamsFormat::Yaml })
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        std::fs::write(dir.path().join("buildcfg.yaml"), "{}").unwrap();

        let result = handle_params_command(
            &paths,
            ParamsCommands::Init {
                output: None,
                format: ParamsFormat::Yaml,
                force: false,
            },
        );
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(dir.path().join("buildcfg.yaml")).unwrap(), "{}");
    }
}
