//! Environment exports and the secondary packages they list.
//!
//! `conda-env export` prints an environment's dependencies as YAML. Plain
//! strings are conda packages; a single-key mapping groups the packages a
//! secondary installer put in place:
//!
//! ```yaml
//! name: py3
//! dependencies:
//!   - xz=5.2.3=0
//!   - pip:
//!     - rpaths==0.13
//!     - nmtest (/home/dev/nmtest)==0.1
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::distributions::details::{canonical_name, CollectedPackages};
use crate::distributions::pip::SecondaryLookup;
use crate::report::Reporter;
use crate::session::Session;
use crate::shell::quote_path;

/// `name`, `name==version`, `name (location)` or `name (location)==version`.
static SPEC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^\s=()]+)\s*(?:\((?P<location>[^)]*)\))?\s*(?:={1,3}(?P<version>.+))?$")
        .expect("SPEC_REGEX must compile")
});

/// Error text of `conda-env` releases that predate `export -p`.
const OLD_CONDA_ERROR: &str = "unrecognized arguments: -p";

/// Parsed `conda-env export` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvExport {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<ExportDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExportDependency {
    /// A conda package, `name=version=build`.
    Package(String),
    /// Packages of another installer, keyed by installer name.
    Installer(BTreeMap<String, Vec<String>>),
    /// Anything else; ignored.
    Other(serde_yaml::Value),
}

impl EnvExport {
    /// Parse export YAML. Empty output is an empty export.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// Specs listed under `installer`, from the first group naming it.
    pub fn secondary_specs(&self, installer: &str) -> Vec<SecondarySpec> {
        self.dependencies
            .iter()
            .find_map(|dep| match dep {
                ExportDependency::Installer(groups) => groups.get(installer),
                _ => None,
            })
            .map(|specs| specs.iter().filter_map(|s| SecondarySpec::parse(s)).collect())
            .unwrap_or_default()
    }
}

/// A package entry of a secondary installer in an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondarySpec {
    pub name: String,
    /// Source checkout of an editable install.
    pub location: Option<PathBuf>,
    pub version: Option<String>,
}

impl SecondarySpec {
    /// Parse a spec string. Unrecognized shapes fall back to the text up to
    /// the first `=` or space as the name.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if let Some(caps) = SPEC_REGEX.captures(spec) {
            return Some(Self {
                name: caps["name"].to_string(),
                location: caps
                    .name("location")
                    .map(|m| m.as_str().trim())
                    .filter(|l| !l.is_empty())
                    .map(PathBuf::from),
                version: caps
                    .name("version")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|v| !v.is_empty()),
            });
        }

        let name = spec.split('=').next()?.split(' ').next()?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            location: None,
            version: None,
        })
    }
}

/// Run `conda-env export` for `env` with the tools of `root`.
///
/// Failures are reported and yield an empty export.
pub fn fetch_export(
    session: &dyn Session,
    root: &Path,
    env: &Path,
    reporter: &dyn Reporter,
) -> EnvExport {
    let command = format!(
        "{} export -p {}",
        quote_path(&root.join("bin").join("conda-env")),
        quote_path(env)
    );

    let out = match session.execute(&command) {
        Ok(out) => out,
        Err(e) => {
            let message = e.to_string();
            if message.contains(OLD_CONDA_ERROR) {
                reporter.warning(&format!(
                    "Could not retrieve conda environment export from path {}: \
                     Please use Conda 4.3.19 or greater",
                    env.display()
                ));
            } else {
                reporter.warning(&format!(
                    "Could not retrieve conda environment export from path {}: {}",
                    env.display(),
                    message
                ));
            }
            return EnvExport::default();
        }
    };

    EnvExport::parse(&out.stdout).unwrap_or_else(|e| {
        reporter.warning(&format!(
            "Could not parse conda environment export from path {}: {}",
            env.display(),
            e
        ));
        EnvExport::default()
    })
}

/// Look up the secondary packages an export lists for `env`.
///
/// Every found package is tagged with the lookup's installer. A package the
/// lookup found no location for takes the location from its spec and is
/// then considered editable.
pub fn scan_secondary(
    export: &EnvExport,
    env: &Path,
    session: &dyn Session,
    lookup: &dyn SecondaryLookup,
    reporter: &dyn Reporter,
) -> CollectedPackages {
    let specs = export.secondary_specs(lookup.installer());
    if specs.is_empty() {
        return CollectedPackages::default();
    }

    let names: Vec<String> = specs.iter().map(|s| s.name.clone()).collect();
    let mut found = lookup.lookup(session, &lookup.tool_path(env), &names, reporter);

    for details in found.packages.values_mut() {
        details.installer = Some(lookup.installer().to_string());
        if details.location.is_some() {
            continue;
        }
        let wanted = canonical_name(&details.name);
        let spec_location = specs
            .iter()
            .find(|s| canonical_name(&s.name) == wanted)
            .and_then(|s| s.location.clone());
        if let Some(location) = spec_location {
            details.location = Some(location);
            details.editable = true;
        }
    }

    found
}

/// Merge secondary packages into the primary collection of `env`.
///
/// A secondary package sharing its canonical name with a primary package is
/// dropped with a warning, together with its file claims. Files already
/// owned by a primary package stay with it.
pub fn merge_secondary(
    primary: &mut CollectedPackages,
    secondary: CollectedPackages,
    env: &Path,
    reporter: &dyn Reporter,
) {
    let primary_names: HashSet<String> = primary
        .packages
        .values()
        .map(|d| canonical_name(&d.name))
        .collect();

    let mut dropped = HashSet::new();
    for (key, details) in secondary.packages {
        if primary_names.contains(&canonical_name(&details.name))
            || primary.packages.contains_key(&key)
        {
            reporter.warning(&format!(
                "Package {} from {} in {} is also installed by conda, keeping the conda record",
                details.name,
                details.installer.as_deref().unwrap_or("another installer"),
                env.display()
            ));
            dropped.insert(key);
            continue;
        }
        primary.packages.insert(key, details);
    }

    for (path, key) in secondary.files {
        if !dropped.contains(&key) {
            primary.files.entry(path).or_insert(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::details::{PackageDetails, PackageKey};
    use crate::distributions::pip::PipLookup;
    use crate::report::MockReporter;
    use crate::session::MockSession;

    const EXPORT: &str = "\
name: py3
channels:
  - defaults
dependencies:
  - xz=5.2.3=0
  - pip=9.0.1=py36_1
  - pip:
    - rpaths==0.13
    - nmtest (/home/dev/nmtest)==0.1
    - ruamel_yaml (/srv/ruamel)
prefix: /opt/conda/envs/py3
";

    #[test]
    fn parses_spec_shapes() {
        let spec = SecondarySpec::parse("foo==1.2").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.version.as_deref(), Some("1.2"));
        assert_eq!(spec.location, None);

        let spec = SecondarySpec::parse("foo (/dev/foo)").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.location, Some(PathBuf::from("/dev/foo")));
        assert_eq!(spec.version, None);

        let spec = SecondarySpec::parse("foo (/dev/foo)==0.1.dev0").unwrap();
        assert_eq!(spec.location, Some(PathBuf::from("/dev/foo")));
        assert_eq!(spec.version.as_deref(), Some("0.1.dev0"));

        assert_eq!(SecondarySpec::parse("bare").unwrap().name, "bare");
    }

    #[test]
    fn unusual_specs_fall_back_to_leading_word() {
        let spec = SecondarySpec::parse("-e git+https://host/repo.git#egg=thing").unwrap();
        assert_eq!(spec.name, "-e");
        assert!(SecondarySpec::parse("").is_none());
    }

    #[test]
    fn export_lists_secondary_specs() {
        let export = EnvExport::parse(EXPORT).unwrap();
        assert_eq!(export.name.as_deref(), Some("py3"));
        assert_eq!(export.channels, vec!["defaults"]);

        let names: Vec<_> = export
            .secondary_specs("pip")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["rpaths", "nmtest", "ruamel_yaml"]);
        assert!(export.secondary_specs("npm").is_empty());
    }

    #[test]
    fn empty_export_is_default() {
        assert_eq!(EnvExport::parse("").unwrap(), EnvExport::default());
        assert!(EnvExport::parse("dependencies: [xz=5.2.3=0]")
            .unwrap()
            .secondary_specs("pip")
            .is_empty());
    }

    #[test]
    fn fetch_export_runs_conda_env_of_root() {
        let session = MockSession::new().with_response(
            "/opt/conda/bin/conda-env export -p /opt/conda/envs/py3",
            EXPORT,
        );
        let reporter = MockReporter::new();

        let export = fetch_export(
            &session,
            Path::new("/opt/conda"),
            Path::new("/opt/conda/envs/py3"),
            &reporter,
        );

        assert_eq!(export.dependencies.len(), 3);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn old_conda_gets_an_upgrade_hint() {
        let session = MockSession::new().with_failure(
            "/opt/conda/bin/conda-env export -p /opt/conda/envs/py3",
            Some(2),
            "conda-env: error: unrecognized arguments: -p",
        );
        let reporter = MockReporter::new();

        let export = fetch_export(
            &session,
            Path::new("/opt/conda"),
            Path::new("/opt/conda/envs/py3"),
            &reporter,
        );

        assert_eq!(export, EnvExport::default());
        assert!(reporter.has_warning("Please use Conda 4.3.19 or greater"));
    }

    #[test]
    fn other_export_failures_are_reported_verbatim() {
        let session = MockSession::new();
        let reporter = MockReporter::new();

        fetch_export(&session, Path::new("/r"), Path::new("/r/envs/e"), &reporter);

        assert!(reporter.has_warning("command not found"));
        assert!(!reporter.has_warning("4.3.19"));
    }

    #[test]
    fn scan_tags_installer_and_applies_spec_location() {
        let session = MockSession::new()
            .with_response("/opt/conda/envs/py3/bin/pip list --editable --format=json", "[]")
            .with_response(
                "/opt/conda/envs/py3/bin/pip show -f rpaths nmtest ruamel_yaml",
                "Name: rpaths\nVersion: 0.13\nLocation: /opt/conda/envs/py3/lib/site-packages\n\
                 Files:\n  rpaths.py\n---\nName: ruamel_yaml\nVersion: 0.15\n",
            );
        let reporter = MockReporter::new();
        let export = EnvExport::parse(EXPORT).unwrap();

        let found = scan_secondary(
            &export,
            Path::new("/opt/conda/envs/py3"),
            &session,
            &PipLookup::default(),
            &reporter,
        );

        let rpaths = &found.packages[&PackageKey::named("rpaths")];
        assert_eq!(rpaths.installer.as_deref(), Some("pip"));
        assert!(!rpaths.editable);

        let ruamel = &found.packages[&PackageKey::named("ruamel_yaml")];
        assert_eq!(ruamel.location, Some(PathBuf::from("/srv/ruamel")));
        assert!(ruamel.editable);
    }

    #[test]
    fn scan_without_secondary_group_runs_nothing() {
        let session = MockSession::new();
        let reporter = MockReporter::new();
        let export = EnvExport::parse("dependencies:\n  - xz=5.2.3=0\n").unwrap();

        let found = scan_secondary(
            &export,
            Path::new("/env"),
            &session,
            &PipLookup::default(),
            &reporter,
        );

        assert!(found.is_empty());
        assert!(session.executed().is_empty());
    }

    #[test]
    fn merge_keeps_primary_on_name_collision() {
        let mut primary = CollectedPackages::default();
        let conda_key = PackageKey::conda("PyYAML", "3.12", "py36_0");
        primary
            .packages
            .insert(conda_key.clone(), PackageDetails::new("PyYAML"));
        primary
            .files
            .insert(PathBuf::from("/env/lib/yaml/__init__.py"), conda_key.clone());

        let mut secondary = CollectedPackages::default();
        let mut pyyaml = PackageDetails::new("pyyaml");
        pyyaml.installer = Some("pip".to_string());
        let mut rpaths = PackageDetails::new("rpaths");
        rpaths.installer = Some("pip".to_string());
        secondary.packages.insert(PackageKey::named("pyyaml"), pyyaml);
        secondary.packages.insert(PackageKey::named("rpaths"), rpaths);
        secondary.files.insert(
            PathBuf::from("/env/lib/yaml/__init__.py"),
            PackageKey::named("rpaths"),
        );
        secondary.files.insert(
            PathBuf::from("/env/lib/yaml/cyaml.py"),
            PackageKey::named("pyyaml"),
        );
        secondary
            .files
            .insert(PathBuf::from("/env/lib/rpaths.py"), PackageKey::named("rpaths"));
        let reporter = MockReporter::new();

        merge_secondary(&mut primary, secondary, Path::new("/env"), &reporter);

        let names: Vec<_> = primary.packages.values().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["PyYAML", "rpaths"]);
        assert_eq!(
            primary.files[Path::new("/env/lib/yaml/__init__.py")],
            conda_key
        );
        assert!(!primary.files.contains_key(Path::new("/env/lib/yaml/cyaml.py")));
        assert_eq!(
            primary.files[Path::new("/env/lib/rpaths.py")],
            PackageKey::named("rpaths")
        );
        assert!(reporter.has_warning("Package pyyaml from pip in /env is also installed by conda"));
    }
}
