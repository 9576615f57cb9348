use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{
    check::handle_check_command,
    key_properties::{handle_key_properties_command, KeyPropertiesCommands},
    params::{handle_params_command, ParamsCommands},
    resolve::{handle_resolve_command, ResolveArgs},
};

#[derive(Parser)]
#[command(name = "buildcfg", version)]
#[command(about = "Materialize Android build configuration for Flutter apps", long_about = None)]
struct Cli {
    /// Project root (the Flutter app directory)
    #[arg(long, global = true, env = "BUILDCFG_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Signing property file (relative to the project root)
    #[arg(long, global = true)]
    properties: Option<PathBuf>,

    /// Static params file, YAML or HUML (relative to the project root)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration for a build variant
    Resolve(ResolveArgs),

    /// Check that release signing properties are complete
    Check,

    /// Manage the signing property file
    #[command(subcommand)]
    KeyProperties(KeyPropertiesCommands),

    /// Manage the static params file
    #[command(subcommand)]
    Params(ParamsCommands),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "buildcfg=debug,buildcfg_core=debug"
    } else {
        "buildcfg=info,buildcfg_core=info"
    };

    // Logs go to stderr so stdout carries only rendered output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = config::resolve_paths(
        &cli.project_dir,
        cli.properties.as_deref(),
        cli.params.as_deref(),
    );
    tracing::debug!(?paths, "Resolved input paths");

    match cli.command {
        Commands::Resolve(args) => handle_resolve_command(&paths, args)?,
        Commands::Check => handle_check_command(&paths)?,
        Commands::KeyProperties(cmd) => handle_key_properties_command(&paths, cmd)?,
        Commands::Params(cmd) => handle_params_command(&paths, cmd)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildcfg_core::BuildVariant;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_and_variant_parse_together() {
        let cli = Cli::try_parse_from(["buildcfg", "resolve", "--verbose", "--variant", "debug"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Resolve(args) => assert_eq!(args.variant, BuildVariant::Debug),
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_no_short_flag_for_variant() {
        assert!(Cli::try_parse_from(["buildcfg", "resolve", "-v", "debug"]).is_err());
    }
}
