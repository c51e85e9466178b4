//! The conda tracer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::CondaSettings;
use crate::distributions::pip::{PipLookup, SecondaryLookup};
use crate::distributions::root::RootFinder;
use crate::distributions::{Distribution, DistributionTracer, UnknownFiles};
use crate::report::Reporter;
use crate::session::Session;

use super::assemble::assemble;
use super::attribute::attribute;
use super::export::{fetch_export, merge_secondary, scan_secondary, EnvExport};
use super::group::group;
use super::{meta, CondaDistribution, CondaEnvironment, META_DIR};

/// Finds conda environments enclosing a set of files and attributes the
/// files to the packages installed there.
///
/// # Example
///
/// ```
/// use envtrace::distributions::{CondaTracer, UnknownFiles};
/// use envtrace::report::MockReporter;
/// use envtrace::session::MockSession;
/// use std::path::PathBuf;
///
/// let session = MockSession::new()
///     .with_dir("/opt/conda/bin")
///     .with_dir("/opt/conda/envs")
///     .with_file(
///         "/opt/conda/conda-meta/xz-5.2.3-0.json",
///         r#"{"name": "xz", "version": "5.2.3", "build": "0", "files": ["bin/xz"]}"#,
///     );
/// let reporter = MockReporter::new();
/// let files: UnknownFiles = [PathBuf::from("/opt/conda/bin/xz")].into_iter().collect();
///
/// let mut tracer = CondaTracer::new(&session, &reporter);
/// let found = tracer.identify(&files);
///
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].0.environments[0].packages[0].name, "xz");
/// assert!(found[0].1.is_empty());
/// ```
pub struct CondaTracer<'a> {
    session: &'a dyn Session,
    reporter: &'a dyn Reporter,
    settings: CondaSettings,
    lookup: Box<dyn SecondaryLookup + 'a>,
    env_roots: RootFinder,
    manager_roots: RootFinder,
}

impl<'a> CondaTracer<'a> {
    pub fn new(session: &'a dyn Session, reporter: &'a dyn Reporter) -> Self {
        Self::with_settings(session, reporter, CondaSettings::default())
    }

    pub fn with_settings(
        session: &'a dyn Session,
        reporter: &'a dyn Reporter,
        settings: CondaSettings,
    ) -> Self {
        let lookup = PipLookup::new(settings.pip_batch_size);
        Self {
            session,
            reporter,
            settings,
            lookup: Box::new(lookup),
            env_roots: RootFinder::new(),
            manager_roots: RootFinder::new(),
        }
    }

    /// Replace the secondary-installer lookup.
    pub fn with_lookup(mut self, lookup: impl SecondaryLookup + 'a) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Nearest directory at or above `path` holding a `conda-meta` directory.
    pub fn find_environment(&mut self, path: &Path) -> Option<PathBuf> {
        let session = self.session;
        self.env_roots
            .find(path, |dir| session.exists(&dir.join(META_DIR)))
    }

    /// Nearest conda installation at or above `env`.
    pub fn find_root(&mut self, env: &Path) -> Option<PathBuf> {
        let session = self.session;
        self.manager_roots.find(env, |dir| {
            ["bin", "envs", META_DIR]
                .iter()
                .all(|sub| session.exists(&dir.join(sub)))
        })
    }

    /// Trace `files`.
    ///
    /// Environments are visited in path order and share one unknown set, so
    /// a file owned in two environments goes to the first.
    pub fn identify(&mut self, files: &UnknownFiles) -> Vec<(CondaDistribution, UnknownFiles)> {
        let mut unknown = files.clone();
        let total = unknown.len();

        let environments: BTreeSet<PathBuf> = files
            .iter()
            .filter_map(|file| self.find_environment(file))
            .collect();

        let mut by_root: BTreeMap<PathBuf, Vec<CondaEnvironment>> = BTreeMap::new();
        let mut package_count = 0;

        for env in environments {
            let Some(root) = self.find_root(&env) else {
                self.reporter.warning(&format!(
                    "Could not find root path for conda environment {}",
                    env.display()
                ));
                continue;
            };

            let environment = self.trace_environment(&env, &root, &mut unknown);
            package_count += environment.packages.len();
            by_root.entry(root).or_default().push(environment);
        }

        self.reporter.debug(&format!(
            "{}: {} packages with {} files, and {} other files",
            self.name(),
            package_count,
            total.saturating_sub(unknown.len()),
            unknown.len()
        ));

        group(
            self.session,
            by_root,
            &unknown,
            &self.settings.name,
            self.reporter,
        )
    }

    fn trace_environment(
        &self,
        env: &Path,
        root: &Path,
        unknown: &mut UnknownFiles,
    ) -> CondaEnvironment {
        let export = if self.settings.trace_pip {
            fetch_export(self.session, root, env, self.reporter)
        } else {
            EnvExport::default()
        };

        let mut collected = meta::collect(self.session, env, self.reporter);

        if self.settings.trace_pip {
            let secondary = scan_secondary(
                &export,
                env,
                self.session,
                self.lookup.as_ref(),
                self.reporter,
            );
            merge_secondary(&mut collected, secondary, env, self.reporter);
        }

        let files = attribute(unknown, &collected.files, env);
        assemble(env, root, collected.packages, files, unknown, self.reporter)
    }
}

impl DistributionTracer for CondaTracer<'_> {
    fn name(&self) -> &str {
        "conda"
    }

    fn identify_distributions(
        &mut self,
        files: &UnknownFiles,
    ) -> Vec<(Box<dyn Distribution>, UnknownFiles)> {
        self.identify(files)
            .into_iter()
            .map(|(dist, unknown)| (Box::new(dist) as Box<dyn Distribution>, unknown))
            .collect()
    }
}
