//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::TraceConfig;
use crate::config::validator::validate;
use crate::error::{Result, TraceError};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".envtrace.yml";

/// Configuration files in merge order (later overrides earlier).
///
/// 1. The nearest `.envtrace.yml` at or above the working directory
/// 2. The file given with `--config` / `ENVTRACE_CONFIG`
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub discovered: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files starting at `start`.
    pub fn discover(start: &Path, explicit: Option<&Path>) -> Self {
        Self {
            discovered: find_config_file(start),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// All config paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        self.discovered.iter().chain(self.explicit.iter()).collect()
    }
}

/// Walk up from `start` looking for [`CONFIG_FILE_NAME`].
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file as a raw YAML value for merging.
///
/// An empty file loads as an empty mapping.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TraceError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TraceError::Io(e)
        }
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| TraceError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if value.is_null() {
        Ok(serde_yaml::Value::Mapping(Default::default()))
    } else {
        Ok(value)
    }
}

/// Load, merge and validate configuration.
///
/// # Errors
///
/// Returns `ConfigNotFound` if `explicit` is given but does not exist.
/// Returns `ConfigParseError` if any file is invalid.
/// Returns `ConfigValidationError` if the merged values are unusable.
pub fn load_config(start: &Path, explicit: Option<&Path>) -> Result<TraceConfig> {
    let paths = ConfigPaths::discover(start, explicit);

    let mut layers = Vec::new();
    for path in paths.all() {
        tracing::debug!("loading config from {}", path.display());
        layers.push(load_config_value(path)?);
    }

    let source = paths
        .all()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| start.join(CONFIG_FILE_NAME));

    let config: TraceConfig =
        serde_yaml::from_value(merge_configs(&layers)).map_err(|e| TraceError::ConfigParseError {
            path: source,
            message: format!("Failed to parse merged config: {}", e),
        })?;

    validate(&config)?;
    Ok(config)
}
