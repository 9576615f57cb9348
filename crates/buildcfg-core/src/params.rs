//! Static build parameters.
//!
//! Everything about the Android module that does not come from the signing
//! property file: identifiers, SDK pins, Java settings, variant flags,
//! packaging exclusions and dependency declarations. Supports both YAML and
//! HUML files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildCfgError, Result};
use crate::exclusions::PackagingExclusionSet;
use crate::variant::{BuildVariant, VariantFlags};

/// Default params file name, looked up in the project root.
pub const DEFAULT_PARAMS_FILE: &str = "buildcfg.yaml";

/// Format of a params file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamsFormat {
    #[default]
    Yaml,
    Huml,
}

impl ParamsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamsFormat::Yaml => "yaml",
            ParamsFormat::Huml => "huml",
        }
    }
}

impl std::fmt::Display for ParamsFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ParamsFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ParamsFormat::Yaml),
            "huml" => Ok(ParamsFormat::Huml),
            _ => Err(format!("Unknown params format: {}", s)),
        }
    }
}

/// SDK pins. `None` means the value is inherited from the Flutter toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_sdk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sdk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sdk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
}

/// App version. `None` fields come from `pubspec.yaml` via Flutter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Java/Kotlin compilation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaOptions {
    pub source_compatibility: u32,
    pub target_compatibility: u32,
    pub jvm_target: String,
    pub core_library_desugaring: bool,
}

impl Default for JavaOptions {
    fn default() -> Self {
        Self {
            source_compatibility: 17,
            target_compatibility: 17,
            jvm_target: "17".to_string(),
            core_library_desugaring: true,
        }
    }
}

/// Per-variant flags. A variant section in a params file replaces that
/// variant's defaults wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTable {
    pub release: VariantFlags,
    pub debug: VariantFlags,
}

impl Default for VariantTable {
    fn default() -> Self {
        Self {
            release: VariantFlags::release(),
            debug: VariantFlags::debug(),
        }
    }
}

impl VariantTable {
    pub fn get(&self, variant: BuildVariant) -> &VariantFlags {
        match variant {
            BuildVariant::Release => &self.release,
            BuildVariant::Debug => &self.debug,
        }
    }
}

/// A Gradle dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Gradle configuration, e.g. `implementation`.
    pub configuration: String,
    /// Maven coordinate `group:artifact:version`.
    pub coordinate: String,
}

impl Dependency {
    pub fn new(configuration: &str, coordinate: &str) -> Self {
        Self {
            configuration: configuration.to_string(),
            coordinate: coordinate.to_string(),
        }
    }
}

/// The static parameter table merged with signing properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticParams {
    pub namespace: String,
    pub application_id: String,
    pub sdk: SdkVersions,
    pub version: AppVersion,
    pub java: JavaOptions,
    pub multidex: bool,
    pub variants: VariantTable,
    pub packaging_excludes: PackagingExclusionSet,
    pub dependencies: Vec<Dependency>,
    /// Path to the Flutter project, relative to the Android app module.
    pub flutter_source: String,
}

impl Default for StaticParams {
    fn default() -> Self {
        Self {
            namespace: "com.joyscroll.app".to_string(),
            application_id: "com.joyscroll.app".to_string(),
            sdk: SdkVersions::default(),
            version: AppVersion::default(),
            java: JavaOptions::default(),
            multidex: true,
            variants: VariantTable::default(),
            packaging_excludes: PackagingExclusionSet::defaults(),
            dependencies: vec![
                Dependency::new(
                    "coreLibraryDesugaring",
                    "com.android.tools:desugar_jdk_libs:2.1.4",
                ),
                Dependency::new("implementation", "androidx.multidex:multidex:2.0.1"),
            ],
            flutter_source: "../..".to_string(),
        }
    }
}

impl StaticParams {
    /// Checks the table for values Gradle would reject.
    pub fn validate(&self) -> Result<()> {
        validate_identifier("namespace", &self.namespace)?;
        validate_identifier("application_id", &self.application_id)?;

        let sdk = &self.sdk;
        if let (Some(min), Some(target)) = (sdk.min_sdk, sdk.target_sdk) {
            if min > target {
                return Err(BuildCfgError::InvalidParams(format!(
                    "min_sdk ({}) must not exceed target_sdk ({})",
                    min, target
                )));
            }
        }
        if let (Some(target), Some(compile)) = (sdk.target_sdk, sdk.compile_sdk) {
            if target > compile {
                return Err(BuildCfgError::InvalidParams(format!(
                    "target_sdk ({}) must not exceed compile_sdk ({})",
                    target, compile
                )));
            }
        }
        if let (Some(min), Some(compile)) = (sdk.min_sdk, sdk.compile_sdk) {
            if min > compile {
                return Err(BuildCfgError::InvalidParams(format!(
                    "min_sdk ({}) must not exceed compile_sdk ({})",
                    min, compile
                )));
            }
        }

        for variant in BuildVariant::all() {
            let flags = self.variants.get(variant);
            if flags.shrink_resources && !flags.minify_enabled {
                return Err(BuildCfgError::InvalidParams(format!(
                    "{} variant enables shrink_resources without minify_enabled",
                    variant
                )));
            }
        }

        if self.version.code == Some(0) {
            return Err(BuildCfgError::InvalidParams(
                "version.code must be > 0".to_string(),
            ));
        }

        if self.java.jvm_target.trim().is_empty() {
            return Err(BuildCfgError::InvalidParams(
                "java.jvm_target must not be empty".to_string(),
            ));
        }

        for dep in &self.dependencies {
            validate_dependency(dep)?;
        }

        if self.java.core_library_desugaring
            && !self
                .dependencies
                .iter()
                .any(|d| d.configuration == "coreLibraryDesugaring")
        {
            tracing::warn!(
                "core_library_desugaring is enabled but no coreLibraryDesugaring dependency is declared"
            );
        }

        Ok(())
    }
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let segments: Vec<&str> = value.split('.').collect();
    let valid = segments.len() >= 2
        && segments.iter().all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if !valid {
        return Err(BuildCfgError::InvalidParams(format!(
            "{} '{}' is not a valid package name",
            field, value
        )));
    }
    Ok(())
}

fn validate_dependency(dep: &Dependency) -> Result<()> {
    if dep.configuration.trim().is_empty() {
        return Err(BuildCfgError::InvalidParams(format!(
            "Dependency '{}' has an empty configuration",
            dep.coordinate
        )));
    }

    let parts: Vec<&str> = dep.coordinate.split(':').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.trim().is_empty()) {
        return Err(BuildCfgError::InvalidParams(format!(
            "Dependency coordinate '{}' must look like group:artifact[:version]",
            dep.coordinate
        )));
    }
    Ok(())
}

/// Parses a YAML params table.
pub fn parse_params(yaml_content: &str) -> Result<StaticParams> {
    let params: StaticParams = serde_yaml::from_str(yaml_content)?;
    params.validate()?;
    Ok(params)
}

/// Parses a HUML params table.
pub fn parse_params_huml(huml_content: &str) -> Result<StaticParams> {
    let params: StaticParams = huml_rs::serde::from_str(huml_content)
        .map_err(|e| BuildCfgError::Huml(format!("Invalid HUML: {}", e)))?;
    params.validate()?;
    Ok(params)
}

/// Parses a params table, auto-detecting format from content.
///
/// - If starts with `%HUML` → parse as HUML
/// - Otherwise → parse as YAML
pub fn parse_params_auto(content: &str) -> Result<(StaticParams, ParamsFormat)> {
    if content.trim_start().starts_with("%HUML") {
        Ok((parse_params_huml(content)?, ParamsFormat::Huml))
    } else {
        Ok((parse_params(content)?, ParamsFormat::Yaml))
    }
}

/// Reads and parses a params file.
pub fn load_params(path: &Path) -> Result<StaticParams> {
    let content = std::fs::read_to_string(path).map_err(|e| BuildCfgError::io(path, e))?;
    let (params, format) = parse_params_auto(&content)?;
    tracing::debug!("Loaded {} params from {}", format, path.display());
    Ok(params)
}

/// Serializes a params table.
pub fn render_params(params: &StaticParams, format: ParamsFormat) -> Result<String> {
    match format {
        ParamsFormat::Yaml => Ok(serde_yaml::to_string(params)?),
        ParamsFormat::Huml => Ok(render_huml(params)),
    }
}

/// Writes HUML by hand. Nested sections use `key::` with two-space
/// indentation and the dependency list uses `- ::` items, which is the
/// layout `huml_rs::serde::from_str` reads back.
fn render_huml(params: &StaticParams) -> String {
    let mut out = HumlWriter::default();
    out.line(0, "%HUML v0.2.0");

    out.scalar(0, "namespace", quote(&params.namespace));
    out.scalar(0, "application_id", quote(&params.application_id));

    let sdk = &params.sdk;
    let sdk_fields = [
        ("compile_sdk", sdk.compile_sdk.map(|v| v.to_string())),
        ("min_sdk", sdk.min_sdk.map(|v| v.to_string())),
        ("target_sdk", sdk.target_sdk.map(|v| v.to_string())),
        ("ndk_version", sdk.ndk_version.as_deref().map(quote)),
    ];
    out.optional_section(0, "sdk", &sdk_fields);

    let version_fields = [
        ("code", params.version.code.map(|v| v.to_string())),
        ("name", params.version.name.as_deref().map(quote)),
    ];
    out.optional_section(0, "version", &version_fields);

    let java = &params.java;
    out.section(0, "java");
    out.scalar(1, "source_compatibility", java.source_compatibility.to_string());
    out.scalar(1, "target_compatibility", java.target_compatibility.to_string());
    out.scalar(1, "jvm_target", quote(&java.jvm_target));
    out.scalar(1, "core_library_desugaring", java.core_library_desugaring.to_string());

    out.scalar(0, "multidex", params.multidex.to_string());

    out.section(0, "variants");
    for variant in BuildVariant::all() {
        let flags = params.variants.get(variant);
        out.section(1, variant.as_str());
        out.scalar(2, "minify_enabled", flags.minify_enabled.to_string());
        out.scalar(2, "shrink_resources", flags.shrink_resources.to_string());
        out.scalar(2, "debuggable", flags.debuggable.to_string());
        if let Some(suffix) = &flags.application_id_suffix {
            out.scalar(2, "application_id_suffix", quote(suffix));
        }
        if let Some(suffix) = &flags.version_name_suffix {
            out.scalar(2, "version_name_suffix", quote(suffix));
        }
        if !flags.proguard_files.is_empty() {
            out.list(2, "proguard_files", flags.proguard_files.iter().map(String::as_str));
        }
        out.scalar(2, "signed", flags.signed.to_string());
    }

    out.list(0, "packaging_excludes", params.packaging_excludes.iter());

    if params.dependencies.is_empty() {
        out.line(0, "dependencies:: []");
    } else {
        out.section(0, "dependencies");
        for dep in &params.dependencies {
            out.line(1, "- ::");
            out.scalar(2, "configuration", quote(&dep.configuration));
            out.scalar(2, "coordinate", quote(&dep.coordinate));
        }
    }

    out.scalar(0, "flutter_source", quote(&params.flutter_source));
    out.0
}

#[derive(Default)]
struct HumlWriter(String);

impl HumlWriter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.0.push_str("  ");
        }
        self.0.push_str(text);
        self.0.push('\n');
    }

    fn scalar(&mut self, depth: usize, key: &str, value: String) {
        self.line(depth, &format!("{}: {}", key, value));
    }

    fn section(&mut self, depth: usize, key: &str) {
        self.line(depth, &format!("{}::", key));
    }

    /// Emits the section only when at least one field is set.
    fn optional_section(&mut self, depth: usize, key: &str, fields: &[(&str, Option<String>)]) {
        if fields.iter().all(|(_, value)| value.is_none()) {
            return;
        }
        self.section(depth, key);
        for (name, value) in fields {
            if let Some(value) = value {
                self.scalar(depth + 1, name, value.clone());
            }
        }
    }

    fn list<'a>(&mut self, depth: usize, key: &str, items: impl Iterator<Item = &'a str>) {
        let items: Vec<String> = items.map(quote).collect();
        if items.is_empty() {
            self.line(depth, &format!("{}:: []", key));
        } else {
            self.line(depth, &format!("{}:: {}", key, items.join(", ")));
        }
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = StaticParams::default();
        params.validate().unwrap();
        assert_eq!(params.application_id, "com.joyscroll.app");
        assert_eq!(params.java.jvm_target, "17");
        assert!(params.multidex);
        assert_eq!(params.dependencies.len(), 2);
        assert_eq!(params.packaging_excludes.len(), 4);
    }

    #[test]
    fn test_parse_empty_yaml_mapping_uses_defaults() {
        let params = parse_params("{}").unwrap();
        assert_eq!(params, StaticParams::default());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
application_id: com.example.shop
sdk:
  compile_sdk: 35
  min_sdk: 23
  target_sdk: 34
version:
  code: 42
  name: "2.1.0"
packaging_excludes:
  - META-INF/LICENSE*
  - META-INF/LICENSE*
"#;
        let params = parse_params(yaml).unwrap();
        assert_eq!(params.application_id, "com.example.shop");
        assert_eq!(params.namespace, "com.joyscroll.app");
        assert_eq!(params.sdk.compile_sdk, Some(35));
        assert_eq!(params.sdk.ndk_version, None);
        assert_eq!(params.version.code, Some(42));
        assert_eq!(params.packaging_excludes.len(), 1);
        assert_eq!(params.variants, VariantTable::default());
    }

    #[test]
    fn test_variant_section_replaces_defaults() {
        let yaml = r#"
variants:
  debug:
    debuggable: true
    application_id_suffix: ".dev"
"#;
        let params = parse_params(yaml).unwrap();
        assert_eq!(params.variants.debug.application_id_suffix.as_deref(), Some(".dev"));
        assert_eq!(params.variants.debug.version_name_suffix, None);
        assert_eq!(params.variants.release, VariantFlags::release());
    }

    #[test]
    fn test_invalid_identifier() {
        let err = parse_params("application_id: not-a-package").unwrap_err();
        assert!(matches!(err, BuildCfgError::InvalidParams(_)));

        let err = parse_params("namespace: single").unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }

    #[test]
    fn test_invalid_sdk_ordering() {
        let err = parse_params("sdk:\n  min_sdk: 30\n  target_sdk: 24\n").unwrap_err();
        assert!(err.to_string().contains("min_sdk"));

        let err = parse_params("sdk:\n  target_sdk: 35\n  compile_sdk: 34\n").unwrap_err();
        assert!(err.to_string().contains("compile_sdk"));

        let err = parse_params("sdk:\n  min_sdk: 35\n  compile_sdk: 30\n").unwrap_err();
        assert!(err.to_string().contains("min_sdk (35) must not exceed compile_sdk (30)"));

        parse_params("sdk:\n  min_sdk: 21\n  compile_sdk: 35\n").unwrap();
    }

    #[test]
    fn test_shrink_requires_minify() {
        let yaml = r#"
variants:
  debug:
    debuggable: true
    shrink_resources: true
"#;
        let err = parse_params(yaml).unwrap_err();
        assert!(matches!(err, BuildCfgError::InvalidParams(_)));
        assert!(err.to_string().contains("debug variant"));
    }

    #[test]
    fn test_huml_render_reads_back_defaults() {
        let rendered = render_params(&StaticParams::default(), ParamsFormat::Huml).unwrap();
        assert!(rendered.starts_with("%HUML"));

        let (params, format) = parse_params_auto(&rendered).unwrap();
        assert_eq!(format, ParamsFormat::Huml);
        assert_eq!(params, StaticParams::default());
    }

    #[test]
    fn test_huml_and_yaml_render_parse_to_same_table() {
        let mut params = StaticParams {
            application_id: "com.example.shop".to_string(),
            sdk: SdkVersions {
                compile_sdk: Some(35),
                min_sdk: Some(23),
                target_sdk: Some(34),
                ndk_version: Some("27.0.12077973".to_string()),
            },
            version: AppVersion {
                code: Some(12),
                name: Some("3.0.0 \"beta\"".to_string()),
            },
            multidex: false,
            ..Default::default()
        };
        params.variants.debug.proguard_files = vec!["debug-rules.pro".to_string()];
        params.packaging_excludes.insert("META-INF/AL2.0").unwrap();

        let from_yaml = parse_params(&render_params(&params, ParamsFormat::Yaml).unwrap()).unwrap();
        let from_huml =
            parse_params_huml(&render_params(&params, ParamsFormat::Huml).unwrap()).unwrap();

        assert_eq!(from_yaml, params);
        assert_eq!(from_huml, from_yaml);
    }

    #[test]
    fn test_hand_written_yaml_and_huml_agree() {
        let yaml = r#"
application_id: com.example.same
sdk:
  min_sdk: 24
variants:
  debug:
    debuggable: true
    application_id_suffix: ".dev"
dependencies:
  - configuration: implementation
    coordinate: "androidx.core:core-ktx:1.13.1"
"#;
        let huml = "%HUML v0.2.0
application_id: \"com.example.same\"
sdk::
  min_sdk: 24
variants::
  debug::
    debuggable: true
    application_id_suffix: \".dev\"
dependencies::
  - ::
    configuration: \"implementation\"
    coordinate: \"androidx.core:core-ktx:1.13.1\"
";
        assert_eq!(parse_params(yaml).unwrap(), parse_params_huml(huml).unwrap());
    }

    #[test]
    fn test_zero_version_code() {
        let err = parse_params("version:\n  code: 0\n").unwrap_err();
        assert!(err.to_string().contains("version.code"));
    }

    #[test]
    fn test_invalid_dependency() {
        let yaml = r#"
dependencies:
  - configuration: implementation
    coordinate: "justaname"
"#;
        assert!(parse_params(yaml).is_err());
    }

    #[test]
    fn test_invalid_exclusion_glob() {
        let err = parse_params("packaging_excludes:\n  - \"[broken\"\n").unwrap_err();
        assert!(matches!(err, BuildCfgError::Yaml(_)));
    }

    #[test]
    fn test_parse_huml() {
        let huml = "%HUML v0.2.0
application_id: \"com.example.huml\"
multidex: false
sdk::
  min_sdk: 24
packaging_excludes:: \"META-INF/DEPENDENCIES\", \"META-INF/AL2.0\"
";
        let params = parse_params_huml(huml).unwrap();
        assert_eq!(params.application_id, "com.example.huml");
        assert!(!params.multidex);
        assert_eq!(params.sdk.min_sdk, Some(24));
        assert_eq!(params.packaging_excludes.len(), 2);
    }

    #[test]
    fn test_parse_auto_detects_format() {
        let (_, format) = parse_params_auto("  %HUML v0.2.0\nmultidex: true\n").unwrap();
        assert_eq!(format, ParamsFormat::Huml);

        let (_, format) = parse_params_auto("multidex: true\n").unwrap();
        assert_eq!(format, ParamsFormat::Yaml);
    }

    #[test]
    fn test_yaml_render_reads_back() {
        let params = StaticParams {
            sdk: SdkVersions {
                compile_sdk: Some(35),
                ..Default::default()
            },
            ..Default::default()
        };
        let rendered = render_params(&params, ParamsFormat::Yaml).unwrap();
        assert_eq!(parse_params(&rendered).unwrap(), params);
    }

    #[test]
    fn test_params_format_from_str() {
        assert_eq!("yml".parse::<ParamsFormat>().unwrap(), ParamsFormat::Yaml);
        assert_eq!("HUML".parse::<ParamsFormat>().unwrap(), ParamsFormat::Huml);
        assert!("toml".parse::<ParamsFormat>().is_err());
    }
}
