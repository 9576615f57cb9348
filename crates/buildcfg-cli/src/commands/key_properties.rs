//! `buildcfg key-properties` — provision or remove the signing property file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use buildcfg_core::properties::{cleanup_key_properties, write_key_properties};
use clap::Subcommand;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ResolvedPaths;

#[derive(Subcommand)]
pub enum KeyPropertiesCommands {
    /// Write key.properties for a release keystore
    Write {
        /// Path to the keystore, as Gradle should see it
        #[arg(long)]
        store_file: PathBuf,

        /// Key alias inside the keystore
        #[arg(long)]
        key_alias: String,

        /// Keystore password
        #[arg(long, env = "BUILDCFG_STORE_PASSWORD", hide_env_values = true)]
        store_password: String,

        /// Key password (defaults to the keystore password)
        #[arg(long, env = "BUILDCFG_KEY_PASSWORD", hide_env_values = true)]
        key_password: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Remove key.properties
    Clean,
}

pub fn handle_key_properties_command(paths: &ResolvedPaths, cmd: KeyPropertiesCommands) -> Result<()> {
    match cmd {
        KeyPropertiesCommands::Write {
            store_file,
            key_alias,
            store_password,
            key_password,
            force,
        } => {
            let store_password = SecretString::from(store_password);
            let key_password = key_password
                .map(SecretString::from)
                .unwrap_or_else(|| store_password.clone());

            write_key_properties(
                &paths.properties,
                &store_file,
                store_password.expose_secret(),
                &key_alias,
                key_password.expose_secret(),
                force,
            )
            .with_context(|| format!("Failed to write {}", paths.properties.display()))?;

            println!("Wrote {}", paths.properties.display());
        }
        KeyPropertiesCommands::Clean => {
            if cleanup_key_properties(&paths.properties)? {
                println!("Removed {}", paths.properties.display());
            } else {
                println!("Nothing to remove at {}", paths.properties.display());
            }
        }
    }
    Ok(())
}
