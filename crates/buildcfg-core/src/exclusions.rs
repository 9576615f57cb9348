//! Packaging exclusion patterns.
//!
//! Archive paths matching any of these globs are dropped from the packaged
//! artifact, which avoids duplicate-resource conflicts between dependencies.

use std::collections::BTreeSet;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::{BuildCfgError, Result};

/// Exclusions applied when no params file overrides them.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "META-INF/DEPENDENCIES",
    "META-INF/LICENSE*",
    "META-INF/NOTICE*",
    "META-INF/*.kotlin_module",
];

/// A deduplicated set of glob patterns.
///
/// Stored sorted so rendered output is stable regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PackagingExclusionSet {
    patterns: BTreeSet<String>,
}

impl PackagingExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default META-INF exclusions.
    pub fn defaults() -> Self {
        let mut set = Self::new();
        for pattern in DEFAULT_EXCLUSIONS {
            set.patterns.insert((*pattern).to_string());
        }
        set
    }

    /// Adds a pattern. Returns `false` if it was already present.
    pub fn insert(&mut self, pattern: impl Into<String>) -> Result<bool> {
        let pattern = pattern.into();
        validate_pattern(&pattern)?;
        Ok(self.patterns.insert(pattern))
    }

    /// Adds every pattern from `other`. Repeating a union is a no-op.
    pub fn union(&mut self, other: &PackagingExclusionSet) {
        self.patterns.extend(other.patterns.iter().cloned());
    }

    /// Adds every pattern from an iterator, validating each one.
    pub fn extend_patterns<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            self.insert(pattern)?;
        }
        Ok(())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Returns true if an archive path would be excluded.
    pub fn is_excluded(&self, archive_path: &str) -> bool {
        self.patterns.iter().any(|p| {
            Pattern::new(p)
                .map(|pattern| pattern.matches(archive_path))
                .unwrap_or(false)
        })
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.patterns.iter().cloned().collect()
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(BuildCfgError::InvalidPattern {
            pattern: pattern.to_string(),
            message: "pattern is empty".to_string(),
        });
    }

    Pattern::new(pattern).map_err(|e| BuildCfgError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}

impl TryFrom<Vec<String>> for PackagingExclusionSet {
    type Error = BuildCfgError;

    fn try_from(patterns: Vec<String>) -> Result<Self> {
        let mut set = Self::new();
        set.extend_patterns(patterns)?;
        Ok(set)
    }
}

impl From<PackagingExclusionSet> for Vec<String> {
    fn from(set: PackagingExclusionSet) -> Self {
        set.patterns.into_iter().collect()
    }
}
