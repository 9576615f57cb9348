//! Input path resolution.
//!
//! Priority order: CLI flags > environment variables > files found in the
//! project directory > built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use buildcfg_core::params::{load_params, DEFAULT_PARAMS_FILE};
use buildcfg_core::properties::DEFAULT_PROPERTIES_PATH;
use buildcfg_core::StaticParams;

pub const PROPERTIES_ENV: &str = "BUILDCFG_PROPERTIES";
pub const PARAMS_ENV: &str = "BUILDCFG_PARAMS";

/// Params file names looked up in the project directory, in order.
const PARAMS_CANDIDATES: &[&str] = &[DEFAULT_PARAMS_FILE, "buildcfg.yml", "buildcfg.huml"];

/// Where to read inputs from after applying priority rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub project_dir: PathBuf,
    pub properties: PathBuf,
    /// `None` means built-in defaults.
    pub params: Option<PathBuf>,
}

/// Resolve input paths. Relative paths are taken from the project directory.
///
/// An explicit params path is kept even if the file does not exist yet;
/// commands that read it fail in [`load_static_params`].
pub fn resolve_paths(
    project_dir: &Path,
    properties_flag: Option<&Path>,
    params_flag: Option<&Path>,
) -> ResolvedPaths {
    let env_path = |name: &str| {
        std::env::var_os(name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };

    let properties = properties_flag
        .map(Path::to_path_buf)
        .or_else(|| env_path(PROPERTIES_ENV))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROPERTIES_PATH));

    let params = match params_flag.map(Path::to_path_buf).or_else(|| env_path(PARAMS_ENV)) {
        Some(explicit) => Some(project_dir.join(explicit)),
        None => PARAMS_CANDIDATES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.is_file()),
    };

    ResolvedPaths {
        project_dir: project_dir.to_path_buf(),
        properties: project_dir.join(properties),
        params,
    }
}

/// Load the params table, falling back to defaults when no file is configured.
pub fn load_static_params(paths: &ResolvedPaths) -> Result<StaticParams> {
    match &paths.params {
        Some(path) if !path.is_file() => bail!("Params file not found: {}", path.display()),
        Some(path) => {
            load_params(path).with_context(|| format!("Failed to load params from {}", path.display()))
        }
        None => {
            tracing::debug!("No params file found, using built-in defaults");
            Ok(StaticParams::default())
        }
    }
}
