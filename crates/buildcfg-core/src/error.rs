//! Error types for the buildcfg core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::variant::BuildVariant;

/// Core error type for config materialization.
#[derive(Error, Debug)]
pub enum BuildCfgError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HUML error: {0}")]
    Huml(String),

    #[error("Invalid properties at line {line}: {message}")]
    PropertiesParse { line: usize, message: String },

    #[error("Missing signing key(s) for {variant} build: {}", .missing.join(", "))]
    MissingSigningKey {
        variant: BuildVariant,
        missing: Vec<&'static str>,
    },

    #[error("Invalid packaging pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid build parameters: {0}")]
    InvalidParams(String),

    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl BuildCfgError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildCfgError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for buildcfg operations.
pub type Result<T> = std::result::Result<T, BuildCfgError>;
