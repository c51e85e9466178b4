//! Distribution tracing.
//!
//! A tracer takes a set of absolute file paths observed on a system, finds
//! the package-manager installations those files belong to, and splits the
//! set into files it could attribute to a package and files it could not.
//! The leftovers go to the next tracer (see [`retrace`]).
//!
//! # Modules
//!
//! - [`root`] - memoized search for enclosing environment and manager roots
//! - [`details`] - package metadata shared by all collectors
//! - [`conda`] - the conda tracer (primary manager)
//! - [`pip`] - pip metadata lookup (secondary installer inside conda)
//! - [`retrace`] - chaining several tracers over one file set

pub mod conda;
pub mod details;
pub mod paths;
pub mod pip;
pub mod retrace;
pub mod root;

pub use conda::{CondaDistribution, CondaTracer};
pub use details::{canonical_name, CollectedPackages, PackageDetails, PackageKey};
pub use paths::{is_subpath, normalize_path};
pub use pip::{PipLookup, SecondaryLookup};
pub use retrace::{identify_distributions, TraceOutcome};
pub use root::RootFinder;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Files no tracer has attributed yet. Sorted so every pass over it is
/// reproducible.
pub type UnknownFiles = BTreeSet<PathBuf>;

/// A package as seen by code that does not care which manager installed it.
pub trait Package {
    fn name(&self) -> &str;

    fn version(&self) -> Option<&str>;

    /// Installer that put the package in place, when it is not the
    /// distribution's own manager.
    fn installer(&self) -> Option<&str>;

    /// Attributed files, relative to their environment where possible.
    fn files(&self) -> &[PathBuf];
}

/// A traced distribution.
pub trait Distribution: fmt::Debug {
    /// Family of the distribution, e.g. `"conda"`.
    fn kind(&self) -> &'static str;

    fn name(&self) -> &str;

    fn path(&self) -> Option<&Path>;

    /// All packages across all environments of the distribution.
    fn packages(&self) -> Vec<&dyn Package>;

    /// Serializable form for renderers.
    fn to_value(&self) -> serde_json::Result<serde_json::Value>;
}

/// Something that can claim files for distributions of one family.
pub trait DistributionTracer {
    fn name(&self) -> &str;

    /// Identify distributions owning any of `files`.
    ///
    /// Each distribution comes with the set of files still unknown after
    /// the whole run, so the last pair always carries the final remainder.
    fn identify_distributions(
        &mut self,
        files: &UnknownFiles,
    ) -> Vec<(Box<dyn Distribution>, UnknownFiles)>;
}
