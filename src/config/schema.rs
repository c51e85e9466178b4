//! Configuration schema definitions for envtrace.
//!
//! These structs map to the YAML format of `.envtrace.yml`. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Output settings
    pub settings: Settings,

    /// Conda tracer settings
    pub conda: CondaSettings,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default rendering of `trace` results
    pub format: OutputFormat,
}

/// How trace results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable overview
    #[default]
    Summary,
    /// Full provenance as JSON
    Json,
    /// Full provenance as YAML
    Yaml,
}

/// Settings for the conda tracer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondaSettings {
    /// Distribution name (`<name>` or `<name>-<index>` with several roots)
    pub name: String,

    /// Look up pip packages layered inside conda environments
    pub trace_pip: bool,

    /// Maximum number of packages per `pip show` call
    pub pip_batch_size: usize,
}

impl Default for CondaSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            trace_pip: true,
            pip_batch_size: default_pip_batch_size(),
        }
    }
}

fn default_name() -> String {
    "conda".to_string()
}

fn default_pip_batch_size() -> usize {
    50
}
