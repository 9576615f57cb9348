//! Signing property files (`key.properties`).
//!
//! Reads the `key=value` file that holds keystore credentials for release
//! signing, and generates it for CI provisioning. The reader accepts the
//! subset of the Java `.properties` format that Gradle's `Properties.load`
//! understands in practice.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{BuildCfgError, Result};

pub const KEY_ALIAS: &str = "keyAlias";
pub const KEY_PASSWORD: &str = "keyPassword";
pub const STORE_FILE: &str = "storeFile";
pub const STORE_PASSWORD: &str = "storePassword";

/// Keys a release build needs, in canonical order.
pub const REQUIRED_SIGNING_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

/// Default location of the property file relative to the project root.
pub const DEFAULT_PROPERTIES_PATH: &str = "android/key.properties";

/// String key/value pairs loaded from a property file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningProperties {
    entries: BTreeMap<String, String>,
}

impl SigningProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Required signing keys that are absent or blank.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_SIGNING_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none_or(|v| v.trim().is_empty()))
            .collect()
    }

    /// True when every required signing key has a value.
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Keys that play no part in signing.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.keys()
            .filter(|key| !REQUIRED_SIGNING_KEYS.iter().any(|k| k == key))
            .collect()
    }
}

impl std::fmt::Debug for SigningProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if key.to_lowercase().contains("password") {
                map.entry(key, &"[REDACTED]");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

/// Loads signing properties from `path`.
///
/// A missing file is not an error: it yields an empty mapping and the
/// resolver decides whether the requested variant can live without it.
pub fn load_properties(path: &Path) -> Result<SigningProperties> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No property file at {}, using empty mapping", path.display());
            return Ok(SigningProperties::new());
        }
        Err(e) => return Err(BuildCfgError::io(path, e)),
    };
    let content = decode_properties_bytes(bytes);

    let properties = parse_properties(&content)?;

    for key in properties.unknown_keys() {
        tracing::warn!("Ignoring unknown key '{}' in {}", key, path.display());
    }
    tracing::debug!(
        "Loaded {} properties from {}",
        properties.len(),
        path.display()
    );

    Ok(properties)
}

/// Decodes file bytes as UTF-8, falling back to ISO-8859-1 like
/// `java.util.Properties.load(InputStream)`.
fn decode_properties_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Property file is not UTF-8, decoding as ISO-8859-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Parses `.properties` text.
///
/// Supports `#`/`!` comments, `=`, `:` or whitespace separators, trailing
/// backslash continuations and the usual escapes including `\uXXXX`.
/// Later duplicates win.
pub fn parse_properties(content: &str) -> Result<SigningProperties> {
    let mut properties = SigningProperties::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let trimmed = raw.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while has_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_entry(&logical);
        let key = unescape(raw_key, line_no)?;
        let value = unescape(raw_value, line_no)?;

        if properties.insert(key.clone(), value).is_some() {
            tracing::warn!("Duplicate key '{}' at line {}, last value wins", key, line_no);
        }
    }

    Ok(properties)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// An odd number of trailing backslashes joins the next line.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line into raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let malformed = |hex: &str| BuildCfgError::PropertiesParse {
                    line,
                    message: format!("malformed \\u escape '\\u{}'", hex),
                };
                let hex: String = chars.by_ref().take(4).collect();
                let unit = parse_utf16_unit(&hex).ok_or_else(|| malformed(&hex))?;

                // A high surrogate must be followed by an escaped low surrogate.
                let code = if (0xD800..0xDC00).contains(&unit) {
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => {
                            let low_hex: String = lookahead.by_ref().take(4).collect();
                            parse_utf16_unit(&low_hex).filter(|low| (0xDC00..0xE000).contains(low))
                        }
                        _ => None,
                    };
                    let low = low.ok_or_else(|| malformed(&hex))?;
                    chars = lookahead;
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };

                out.push(char::from_u32(code).ok_or_else(|| malformed(&hex))?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn parse_utf16_unit(hex: &str) -> Option<u32> {
    if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

/// Escapes a value so that `parse_properties` reads it back unchanged.
pub(crate) fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            ' ' if i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// Generates `key.properties` content for Flutter/Gradle.
///
/// The file is read by the Gradle build script to configure signing for
/// release builds.
pub fn generate_key_properties(
    store_file: &Path,
    store_password: &str,
    key_alias: &str,
    key_password: &str,
) -> String {
    format!(
        "{}={}\n\
         {}={}\n\
         {}={}\n\
         {}={}\n",
        STORE_PASSWORD,
        escape_value(store_password),
        KEY_PASSWORD,
        escape_value(key_password),
        KEY_ALIAS,
        escape_value(key_alias),
        STORE_FILE,
        escape_value(&store_file.display().to_string()),
    )
}

/// Writes a `key.properties` file.
///
/// Refuses to replace an existing file unless `force` is set. On Unix the
/// file is readable by the owner only.
pub fn write_key_properties(
    path: &Path,
    store_file: &Path,
    store_password: &str,
    key_alias: &str,
    key_password: &str,
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        return Err(BuildCfgError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BuildCfgError::io(parent, e))?;
    }

    let content = generate_key_properties(store_file, store_password, key_alias, key_password);
    std::fs::write(path, content).map_err(|e| BuildCfgError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| BuildCfgError::io(path, e))?;
    }

    tracing::debug!("Wrote key.properties to {}", path.display());

    Ok(())
}

/// Removes a `key.properties` file. Does nothing if it is absent.
pub fn cleanup_key_properties(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed key.properties from {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildCfgError::io(path, e)),
    }
}
