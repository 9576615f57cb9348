//! Merges signing properties and static params into a resolved config.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use crate::error::{BuildCfgError, Result};
use crate::params::{AppVersion, Dependency, JavaOptions, SdkVersions, StaticParams};
use crate::properties::{
    load_properties, SigningProperties, KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD,
};
use crate::variant::{BuildVariant, VariantFlags};

/// Release signing credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    pub key_alias: String,
    #[serde(serialize_with = "serialize_secret")]
    pub key_password: SecretString,
    pub store_file: String,
    #[serde(serialize_with = "serialize_secret")]
    pub store_password: SecretString,
}

impl SigningConfig {
    /// Builds a signing config, or lists the keys that are missing.
    pub fn from_properties(properties: &SigningProperties) -> std::result::Result<Self, Vec<&'static str>> {
        let missing = properties.missing_keys();
        if !missing.is_empty() {
            return Err(missing);
        }

        let value = |key: &str| properties.get(key).unwrap_or_default().to_string();
        Ok(Self {
            key_alias: value(KEY_ALIAS),
            key_password: SecretString::from(value(KEY_PASSWORD)),
            store_file: value(STORE_FILE),
            store_password: SecretString::from(value(STORE_PASSWORD)),
        })
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// The record handed to the build toolchain.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub variant: BuildVariant,
    pub namespace: String,
    /// Application id with the variant suffix applied.
    pub application_id: String,
    pub version: AppVersion,
    pub sdk: SdkVersions,
    pub java: JavaOptions,
    pub multidex: bool,
    pub flags: VariantFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing: Option<SigningConfig>,
    pub packaging_excludes: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub flutter_source: String,
}

/// Merges `properties` into `params` for the requested variant.
///
/// Pure and deterministic. A variant that is signed with the release config
/// fails with [`BuildCfgError::MissingSigningKey`] unless all four signing
/// keys are present; unsigned variants ignore the properties entirely.
pub fn resolve(
    variant: BuildVariant,
    properties: &SigningProperties,
    params: &StaticParams,
) -> Result<ResolvedConfig> {
    let flags = params.variants.get(variant).clone();

    let signing = if flags.signed {
        let config = SigningConfig::from_properties(properties)
            .map_err(|missing| BuildCfgError::MissingSigningKey { variant, missing })?;
        Some(config)
    } else {
        None
    };

    let application_id = match &flags.application_id_suffix {
        Some(suffix) => format!("{}{}", params.application_id, suffix),
        None => params.application_id.clone(),
    };

    let version = AppVersion {
        code: params.version.code,
        name: match (&params.version.name, &flags.version_name_suffix) {
            (Some(name), Some(suffix)) => Some(format!("{}{}", name, suffix)),
            (name, _) => name.clone(),
        },
    };

    Ok(ResolvedConfig {
        variant,
        namespace: params.namespace.clone(),
        application_id,
        version,
        sdk: params.sdk.clone(),
        java: params.java.clone(),
        multidex: params.multidex,
        flags,
        signing,
        packaging_excludes: params.packaging_excludes.to_vec(),
        dependencies: params.dependencies.clone(),
        flutter_source: params.flutter_source.clone(),
    })
}

/// Reads the property file once and resolves variants against it.
#[derive(Debug)]
pub struct ConfigMaterializer {
    properties_path: PathBuf,
    params: StaticParams,
}

impl ConfigMaterializer {
    pub fn new(properties_path: impl Into<PathBuf>, params: StaticParams) -> Self {
        Self {
            properties_path: properties_path.into(),
            params,
        }
    }

    pub fn properties_path(&self) -> &Path {
        &self.properties_path
    }

    pub fn params(&self) -> &StaticParams {
        &self.params
    }

    /// Loads the properties and resolves `variant`.
    pub fn materialize(&self, variant: BuildVariant) -> Result<ResolvedConfig> {
        let properties = load_properties(&self.properties_path)?;
        let resolved = resolve(variant, &properties, &self.params)?;

        tracing::info!(
            variant = %variant,
            application_id = %resolved.application_id,
            signed = resolved.signing.is_some(),
            "Resolved build configuration"
        );

        Ok(resolved)
    }
}
