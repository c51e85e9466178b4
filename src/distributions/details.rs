//! Per-package metadata shared by the primary and secondary collectors.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

/// Identity of a package inside one environment.
///
/// Primary packages are keyed `name=version=build`, the way conda records
/// them. Secondary packages are keyed by bare name; the two forms cannot
/// collide because a bare name never contains `=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageKey(String);

impl PackageKey {
    pub fn conda(name: &str, version: &str, build: &str) -> Self {
        Self(format!("{name}={version}={build}"))
    }

    pub fn named(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated metadata of one installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDetails {
    pub name: String,
    /// `None` for packages owned by the primary manager.
    pub installer: Option<String>,
    pub version: Option<String>,
    pub build: Option<String>,
    /// Short channel name (`schannel` in conda metadata).
    pub channel_name: Option<String>,
    /// Channel URL.
    pub channel_url: Option<String>,
    pub size: Option<u64>,
    pub md5: Option<String>,
    pub url: Option<String>,
    pub location: Option<PathBuf>,
    pub editable: bool,
}

impl PackageDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Packages in discovery order.
pub type PackageMap = IndexMap<PackageKey, PackageDetails>;

/// Absolute file path to the key of the package that owns it.
pub type FileOwnership = HashMap<PathBuf, PackageKey>;

/// Output of a metadata collector: the packages and who owns which file.
#[derive(Debug, Clone, Default)]
pub struct CollectedPackages {
    pub packages: PackageMap,
    pub files: FileOwnership,
}

impl CollectedPackages {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Normalized package name for cross-installer comparison.
///
/// Lowercases and folds `_` and `.` into `-`, so `PyYAML` and `pyyaml` or
/// `ruamel_yaml` and `ruamel.yaml` compare equal.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '.' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conda_key_joins_with_equals() {
        let key = PackageKey::conda("xz", "5.2.3", "0");
        assert_eq!(key.as_str(), "xz=5.2.3=0");
        assert_eq!(key.to_string(), "xz=5.2.3=0");
    }

    #[test]
    fn named_key_cannot_collide_with_conda_key() {
        assert_ne!(PackageKey::named("xz"), PackageKey::conda("xz", "", ""));
    }

    #[test]
    fn canonical_name_folds_case_and_separators() {
        assert_eq!(canonical_name("PyYAML"), "pyyaml");
        assert_eq!(canonical_name("ruamel_yaml"), canonical_name("ruamel.yaml"));
        assert_eq!(canonical_name(" pip "), "pip");
    }
}
