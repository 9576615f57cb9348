//! buildcfg Core Library
//!
//! Materializes the Android build configuration of a Flutter app from a
//! signing property file and a static parameter table.

pub mod error;
pub mod exclusions;
pub mod output;
pub mod params;
pub mod properties;
pub mod resolver;
pub mod variant;

pub use error::{BuildCfgError, Result};
pub use exclusions::PackagingExclusionSet;
pub use output::{render, OutputFormat};
pub use params::{load_params, StaticParams};
pub use properties::{load_properties, parse_properties, SigningProperties};
pub use resolver::{resolve, ConfigMaterializer, ResolvedConfig, SigningConfig};
pub use variant::{BuildVariant, VariantFlags};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
