//! Build variants and their per-variant flags.

use serde::{Deserialize, Serialize};

/// A named build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Release,
    Debug,
}

impl BuildVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Release => "release",
            BuildVariant::Debug => "debug",
        }
    }

    /// All variants, release first.
    pub fn all() -> [BuildVariant; 2] {
        [BuildVariant::Release, BuildVariant::Debug]
    }
}

impl std::str::FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(BuildVariant::Release),
            "debug" => Ok(BuildVariant::Debug),
            _ => Err(format!("Unknown build variant: {}", s)),
        }
    }
}

impl std::fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flags owned by a single build variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFlags {
    /// Run R8/ProGuard code minification.
    #[serde(default)]
    pub minify_enabled: bool,
    /// Strip unused resources. Only meaningful together with minification.
    #[serde(default)]
    pub shrink_resources: bool,
    #[serde(default)]
    pub debuggable: bool,
    /// Appended to the application id, e.g. `.debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id_suffix: Option<String>,
    /// Appended to the version name, e.g. `-debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proguard_files: Vec<String>,
    /// Whether the variant is signed with the release signing config.
    #[serde(default)]
    pub signed: bool,
}

impl VariantFlags {
    /// Production defaults: optimized, shrunk and signed.
    pub fn release() -> Self {
        Self {
            minify_enabled: true,
            shrink_resources: true,
            debuggable: false,
            application_id_suffix: None,
            version_name_suffix: None,
            proguard_files: vec![
                "proguard-android-optimize.txt".to_string(),
                "proguard-rules.pro".to_string(),
            ],
            signed: true,
        }
    }

    /// Debug defaults: separate app id so debug and release install side by side.
    pub fn debug() -> Self {
        Self {
            minify_enabled: false,
            shrink_resources: false,
            debuggable: true,
            application_id_suffix: Some(".debug".to_string()),
            version_name_suffix: Some("-debug".to_string()),
            proguard_files: Vec::new(),
            signed: false,
        }
    }

    pub fn for_variant(variant: BuildVariant) -> Self {
        match variant {
            BuildVariant::Release => Self::release(),
            BuildVariant::Debug => Self::debug(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_as_str() {
        assert_eq!(BuildVariant::Release.as_str(), "release");
        assert_eq!(BuildVariant::Debug.as_str(), "debug");
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("release".parse::<BuildVariant>().unwrap(), BuildVariant::Release);
        assert_eq!("DEBUG".parse::<BuildVariant>().unwrap(), BuildVariant::Debug);
        assert!("profile".parse::<BuildVariant>().is_err());
    }

    #[test]
    fn test_variant_serde() {
        let json = serde_json::to_string(&BuildVariant::Release).unwrap();
        assert_eq!(json, "\"release\"");
        let parsed: BuildVariant = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(parsed, BuildVariant::Debug);
    }

    #[test]
    fn test_release_defaults() {
        let flags = VariantFlags::release();
        assert!(flags.minify_enabled);
        assert!(flags.shrink_resources);
        assert!(!flags.debuggable);
        assert!(flags.signed);
        assert_eq!(flags.proguard_files.len(), 2);
    }

    #[test]
    fn test_debug_defaults() {
        let flags = VariantFlags::debug();
        assert!(!flags.minify_enabled);
        assert!(flags.debuggable);
        assert!(!flags.signed);
        assert_eq!(flags.application_id_suffix.as_deref(), Some(".debug"));
        assert_eq!(flags.version_name_suffix.as_deref(), Some("-debug"));
    }

    #[test]
    fn test_flags_yaml_defaults_missing_fields() {
        let flags: VariantFlags = serde_yaml::from_str("debuggable: true").unwrap();
        assert!(flags.debuggable);
        assert!(!flags.minify_enabled);
        assert!(flags.application_id_suffix.is_none());
        assert!(flags.proguard_files.is_empty());
    }
}
