//! `buildcfg check` — report whether release signing can proceed.

use anyhow::{bail, Result};
use buildcfg_core::properties::{load_properties, REQUIRED_SIGNING_KEYS};

use crate::config::ResolvedPaths;

pub fn handle_check_command(paths: &ResolvedPaths) -> Result<()> {
    let properties = load_properties(&paths.properties)?;
    let missing = properties.missing_keys();

    println!("Property file: {}", paths.properties.display());
    if !paths.properties.exists() {
        println!("  Status: not found");
    }
    for key in REQUIRED_SIGNING_KEYS {
        let status = if missing.contains(&key) { "missing" } else { "ok" };
        println!("  {:<14} {}", key, status);
    }

    if !missing.is_empty() {
        bail!(
            "Release signing is not configured: missing {}",
            missing.join(", ")
        );
    }

    println!("Release signing is configured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_for(properties: std::path::PathBuf) -> ResolvedPaths {
        ResolvedPaths {
            project_dir: properties.parent().unwrap().to_path_buf(),
            properties,
            params: None,
        }
    }

    #[test]
    fn test_check_complete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "keyAlias=a\nkeyPassword=b\nstoreFile=c.jks\nstorePassword=d\n").unwrap();

        handle_check_command(&paths_for(path)).unwrap();
    }

    #[test]
    fn test_check_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = handle_check_command(&paths_for(dir.path().join("key.properties"))).unwrap_err();
        assert!(err.to_string().contains("keyAlias"));
    }

    #[test]
    fn test_check_partial_names_only_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "keyAlias=a\nkeyPassword=b\nstoreFile=c.jks\n").unwrap();

        let err = handle_check_command(&paths_for(path)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("storePassword"));
        assert!(!message.contains("keyAlias"));
    }
}
