//! Reading `conda-meta/*.json` package manifests.

use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::distributions::details::{CollectedPackages, PackageDetails, PackageKey};
use crate::distributions::paths::normalize_path;
use crate::error::{Result, TraceError};
use crate::report::Reporter;
use crate::session::Session;
use crate::shell::quote_path;

use super::META_DIR;

/// One package manifest as conda writes it.
///
/// Only the fields the tracer uses are read; the rest of the record is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CondaMetaRecord {
    pub name: String,
    pub version: String,
    pub build: String,
    pub files: Vec<String>,
    /// Short channel name, e.g. `conda-forge`.
    #[serde(default)]
    pub schannel: Option<String>,
    /// Channel URL.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Where the package lives when it is not inside the environment.
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub editable: bool,
}

impl CondaMetaRecord {
    pub fn key(&self) -> PackageKey {
        PackageKey::conda(&self.name, &self.version, &self.build)
    }

    fn into_details(self) -> PackageDetails {
        let mut details = PackageDetails::new(self.name);
        details.version = Some(self.version);
        details.build = Some(self.build);
        details.channel_name = self.schannel;
        details.channel_url = self.channel;
        details.size = self.size;
        details.md5 = self.md5;
        details.url = self.url;
        details.location = self.location;
        details.editable = self.editable;
        details
    }
}

/// Parse one manifest, telling malformed JSON apart from a JSON document
/// that lacks required fields.
pub fn parse_record(content: &str, path: &Path) -> Result<CondaMetaRecord> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| TraceError::ManifestParse {
            path: path.to_path_buf(),
            message: format!("not valid JSON: {}", e),
        })?;

    serde_json::from_value(value).map_err(|e| TraceError::ManifestParse {
        path: path.to_path_buf(),
        message: format!("incomplete package record: {}", e),
    })
}

/// Manifest paths of an environment, as listed by `ls`.
pub fn list_manifests(session: &dyn Session, env: &Path) -> Result<Vec<PathBuf>> {
    let command = format!("ls {}/*.json", quote_path(&env.join(META_DIR)));
    let out = session.execute(&command)?;
    Ok(out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Collect every package recorded in `env` and the files each one owns.
///
/// File ownership is first writer wins: manifests are read in listing
/// order and a later claim on an owned path is only logged.
pub fn collect(session: &dyn Session, env: &Path, reporter: &dyn Reporter) -> CollectedPackages {
    let mut collected = CollectedPackages::default();

    let manifests = match list_manifests(session, env) {
        Ok(manifests) => manifests,
        Err(e) => {
            reporter.warning(&format!(
                "Could not retrieve conda-meta files in path {}: {}",
                env.display(),
                e
            ));
            return collected;
        }
    };

    for manifest in manifests {
        let content = match session.execute(&format!("cat {}", quote_path(&manifest))) {
            Ok(out) => out.stdout,
            Err(e) => {
                reporter.warning(&format!(
                    "Could not read conda manifest {}: {}",
                    manifest.display(),
                    e
                ));
                continue;
            }
        };

        let record = match parse_record(&content, &manifest) {
            Ok(record) => record,
            Err(e) => {
                reporter.warning(&e.to_string());
                continue;
            }
        };

        let key = record.key();
        if collected.packages.contains_key(&key) {
            reporter.debug(&format!("Skipping duplicate conda package {}", key));
            continue;
        }
        reporter.debug(&format!("Found conda package {}", record.name));

        for file in &record.files {
            match collected.files.entry(normalize_path(&env.join(file))) {
                Entry::Vacant(slot) => {
                    slot.insert(key.clone());
                }
                Entry::Occupied(owner) => reporter.debug(&format!(
                    "{} is already owned by {}, ignoring claim from {}",
                    owner.key().display(),
                    owner.get(),
                    key
                )),
            }
        }

        collected.packages.insert(key, record.into_details());
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MockReporter;
    use crate::session::MockSession;

    const XZ: &str = r#"{
        "name": "xz",
        "version": "5.2.3",
        "build": "0",
        "schannel": "defaults",
        "channel": "https://repo.anaconda.com/pkgs/main/linux-64",
        "size": 667632,
        "md5": "f0d6ab1eb1f4d4ff2bf5f8e8e4d3a2c1",
        "url": "https://repo.anaconda.com/pkgs/main/linux-64/xz-5.2.3-0.tar.bz2",
        "depends": [],
        "files": ["bin/xz", "lib/liblzma.so", "./bin/../bin/unxz"]
    }"#;

    #[test]
    fn parse_record_reads_known_fields() {
        let record = parse_record(XZ, Path::new("xz.json")).unwrap();
        assert_eq!(record.key().as_str(), "xz=5.2.3=0");
        assert_eq!(record.schannel.as_deref(), Some("defaults"));
        assert_eq!(record.size, Some(667632));
        assert_eq!(record.files.len(), 3);
    }

    #[test]
    fn collect_keeps_location_and_editable() {
        let record = r#"{"name": "mypkg", "version": "0.1", "build": "dev_0",
            "location": "/home/dev/mypkg", "editable": true, "files": []}"#;
        let session =
            MockSession::new().with_file("/env/conda-meta/mypkg-0.1-dev_0.json", record);
        let reporter = MockReporter::new();

        let found = collect(&session, Path::new("/env"), &reporter);

        let details = &found.packages[&PackageKey::conda("mypkg", "0.1", "dev_0")];
        assert_eq!(details.location, Some(PathBuf::from("/home/dev/mypkg")));
        assert!(details.editable);
    }

    #[test]
    fn location_and_editable_are_optional() {
        let record = parse_record(XZ, Path::new("xz.json")).unwrap();
        assert_eq!(record.location, None);
        assert!(!record.editable);
    }

    #[test]
    fn parse_record_distinguishes_failures() {
        let err = parse_record("{not json", Path::new("a.json")).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));

        let err = parse_record(r#"{"name": "a", "version": "1"}"#, Path::new("a.json"))
            .unwrap_err();
        assert!(err.to_string().contains("incomplete package record"));
        assert!(err.to_string().contains("a.json"));
    }

    #[test]
    fn collect_maps_files_to_packages() {
        let session = MockSession::new().with_file("/env/conda-meta/xz-5.2.3-0.json", XZ);
        let reporter = MockReporter::new();

        let found = collect(&session, Path::new("/env"), &reporter);

        let key = PackageKey::conda("xz", "5.2.3", "0");
        assert_eq!(found.packages.len(), 1);
        assert_eq!(found.packages[&key].build.as_deref(), Some("0"));
        assert_eq!(found.packages[&key].installer, None);
        assert_eq!(found.files.get(Path::new("/env/bin/xz")), Some(&key));
        assert_eq!(found.files.get(Path::new("/env/bin/unxz")), Some(&key));
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn collect_skips_bad_records() {
        let session = MockSession::new()
            .with_file("/env/conda-meta/bad-1-0.json", "{oops")
            .with_file("/env/conda-meta/partial-1-0.json", r#"{"name": "partial"}"#)
            .with_file("/env/conda-meta/xz-5.2.3-0.json", XZ);
        let reporter = MockReporter::new();

        let found = collect(&session, Path::new("/env"), &reporter);

        assert_eq!(found.packages.len(), 1);
        assert_eq!(reporter.warnings().len(), 2);
        assert!(reporter.has_warning("bad-1-0.json"));
        assert!(reporter.has_warning("partial-1-0.json"));
    }

    #[test]
    fn first_manifest_keeps_a_shared_file() {
        let a = r#"{"name": "a", "version": "1", "build": "0", "files": ["bin/shared"]}"#;
        let b = r#"{"name": "b", "version": "1", "build": "0", "files": ["bin/shared"]}"#;
        let session = MockSession::new()
            .with_file("/env/conda-meta/a-1-0.json", a)
            .with_file("/env/conda-meta/b-1-0.json", b);
        let reporter = MockReporter::new();

        let found = collect(&session, Path::new("/env"), &reporter);

        assert_eq!(
            found.files.get(Path::new("/env/bin/shared")),
            Some(&PackageKey::conda("a", "1", "0"))
        );
        assert!(reporter
            .debugs()
            .iter()
            .any(|d| d.contains("already owned by a=1=0")));
    }

    #[test]
    fn empty_environment_warns_and_returns_nothing() {
        let session = MockSession::new().with_file("/env/conda-meta/history", "");
        let reporter = MockReporter::new();

        let found = collect(&session, Path::new("/env"), &reporter);

        assert!(found.is_empty());
        assert!(found.files.is_empty());
        assert!(reporter.has_warning("Could not retrieve conda-meta files in path /env"));
    }
}
