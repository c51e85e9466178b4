//! Conda distribution tracing.
//!
//! A conda *root* is an installation (`bin/`, `envs/` and `conda-meta/`
//! side by side). Each root holds one or more *environments*, the root
//! itself being the one named `"root"`. Every environment records one JSON
//! manifest per installed package under `conda-meta/`, listing the files the
//! package owns.
//!
//! The tracer pipeline per run:
//!
//! 1. find the environment enclosing each input file ([`RootFinder`](super::RootFinder))
//! 2. per environment, sorted by path: collect manifests ([`meta`]), scan
//!    pip packages listed in the environment export ([`export`]), claim the
//!    files they own ([`attribute`]) and build the record ([`assemble`])
//! 3. group environments by root into distributions ([`group`])

pub mod assemble;
pub mod attribute;
pub mod export;
pub mod group;
pub mod info;
pub mod meta;
pub mod tracer;

pub use export::{EnvExport, ExportDependency, SecondarySpec};
pub use info::{conda_platform_from_python, CondaInfo};
pub use tracer::CondaTracer;

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Distribution, Package};

/// Manifest directory marking a conda environment.
pub const META_DIR: &str = "conda-meta";

/// A package installed in a conda environment, by conda or by pip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondaPackage {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    #[serde(skip_serializing_if = "is_false")]
    pub editable: bool,
    pub files: Vec<PathBuf>,
}

/// A channel packages of an environment were installed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondaChannel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondaEnvironment {
    pub name: String,
    pub path: PathBuf,
    pub packages: Vec<CondaPackage>,
    pub channels: Vec<CondaChannel>,
}

/// One conda installation and the environments found under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondaDistribution {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conda_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub environments: Vec<CondaEnvironment>,
}

impl CondaDistribution {
    /// Environment with the given name.
    pub fn environment(&self, name: &str) -> Option<&CondaEnvironment> {
        self.environments.iter().find(|e| e.name == name)
    }
}

impl CondaEnvironment {
    /// Package with the given name.
    pub fn package(&self, name: &str) -> Option<&CondaPackage> {
        self.packages.iter().find(|p| p.name == name)
    }
}

impl Package for CondaPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn installer(&self) -> Option<&str> {
        self.installer.as_deref()
    }

    fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Distribution for CondaDistribution {
    fn kind(&self) -> &'static str {
        "conda"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn packages(&self) -> Vec<&dyn Package> {
        self.environments
            .iter()
            .flat_map(|env| env.packages.iter())
            .map(|pkg| pkg as &dyn Package)
            .collect()
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
