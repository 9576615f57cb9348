//! Rendering of resolved configs for the build toolchain.

use serde_json::Value;

use crate::error::Result;
use crate::properties::escape_value;
use crate::resolver::ResolvedConfig;

/// Output encoding for a resolved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    /// Flat `dotted.key=value` lines, readable with `java.util.Properties`.
    Properties,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Properties => "properties",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "properties" | "props" => Ok(OutputFormat::Properties),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Renders `config` in the requested format. Output ends with a newline.
pub fn render(config: &ResolvedConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(config)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(config)?),
        OutputFormat::Properties => {
            let value = serde_json::to_value(config)?;
            let mut lines = Vec::new();
            flatten("", &value, &mut lines);
            let mut out = lines.join("\n");
            out.push('\n');
            Ok(out)
        }
    }
}

fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&join(key), child, lines);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), child, lines);
            }
        }
        Value::Null => {}
        Value::String(s) => lines.push(format!("{}={}", prefix, escape_value(s))),
        other => lines.push(format!("{}={}", prefix, other)),
    }
}
