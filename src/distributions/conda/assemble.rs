//! Building environment records from collected packages.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::distributions::details::{PackageDetails, PackageKey, PackageMap};
use crate::distributions::paths::{is_subpath, normalize_path};
use crate::distributions::UnknownFiles;
use crate::report::Reporter;

use super::{CondaChannel, CondaEnvironment, CondaPackage};

/// `"root"` for the environment living at the root itself, the directory
/// name otherwise.
pub fn environment_name(env: &Path, root: &Path) -> String {
    let env = normalize_path(env);
    if env == normalize_path(root) {
        return "root".to_string();
    }
    env.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| env.display().to_string())
}

/// Assemble the environment record of `env`.
///
/// Packages keep the order of `packages`. Channels are created by the first
/// package naming them. A package located outside the environment (an
/// editable checkout elsewhere) has its location added to `unknown` so a
/// later tracer can claim it.
pub fn assemble(
    env: &Path,
    root: &Path,
    packages: PackageMap,
    mut files: HashMap<PackageKey, Vec<PathBuf>>,
    unknown: &mut UnknownFiles,
    reporter: &dyn Reporter,
) -> CondaEnvironment {
    let mut channels = Vec::new();
    let mut seen_channels = HashSet::new();
    let mut records = Vec::with_capacity(packages.len());

    for (key, details) in packages {
        if let Some(name) = &details.channel_name {
            if seen_channels.insert(name.clone()) {
                channels.push(CondaChannel {
                    name: name.clone(),
                    url: details.channel_url.clone(),
                });
            }
        }

        if let Some(location) = &details.location {
            if !is_subpath(location, env) {
                reporter.debug(&format!(
                    "{} is located outside {} at {}",
                    details.name,
                    env.display(),
                    location.display()
                ));
                unknown.insert(normalize_path(location));
            }
        }

        records.push(package_record(details, files.remove(&key).unwrap_or_default()));
    }

    CondaEnvironment {
        name: environment_name(env, root),
        path: env.to_path_buf(),
        packages: records,
        channels,
    }
}

fn package_record(details: PackageDetails, files: Vec<PathBuf>) -> CondaPackage {
    CondaPackage {
        name: details.name,
        installer: details.installer,
        version: details.version,
        build: details.build,
        channel_name: details.channel_name,
        size: details.size,
        md5: details.md5,
        url: details.url,
        location: details.location,
        editable: details.editable,
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MockReporter;

    fn conda_package(name: &str, channel: &str, url: &str) -> (PackageKey, PackageDetails) {
        let mut details = PackageDetails::new(name);
        details.version = Some("1.0".to_string());
        details.build = Some("0".to_string());
        details.channel_name = Some(channel.to_string());
        details.channel_url = Some(url.to_string());
        (PackageKey::conda(name, "1.0", "0"), details)
    }

    #[test]
    fn names_environments() {
        assert_eq!(environment_name(Path::new("/opt/conda"), Path::new("/opt/conda/")), "root");
        assert_eq!(
            environment_name(Path::new("/opt/conda/envs/py3"), Path::new("/opt/conda")),
            "py3"
        );
        assert_eq!(
            environment_name(Path::new("/opt/conda/envs/py3/."), Path::new("/opt/conda")),
            "py3"
        );
    }

    #[test]
    fn channels_are_deduplicated_in_first_seen_order() {
        let mut packages = PackageMap::new();
        for (key, details) in [
            conda_package("xz", "defaults", "https://repo/main"),
            conda_package("zlib", "conda-forge", "https://forge"),
            conda_package("sqlite", "defaults", "https://repo/other"),
        ] {
            packages.insert(key, details);
        }
        let mut unknown = UnknownFiles::new();

        let env = assemble(
            Path::new("/opt/conda"),
            Path::new("/opt/conda"),
            packages,
            HashMap::new(),
            &mut unknown,
            &MockReporter::new(),
        );

        assert_eq!(env.name, "root");
        assert_eq!(
            env.channels,
            vec![
                CondaChannel {
                    name: "defaults".to_string(),
                    url: Some("https://repo/main".to_string()),
                },
                CondaChannel {
                    name: "conda-forge".to_string(),
                    url: Some("https://forge".to_string()),
                },
            ]
        );
        assert!(env.packages.iter().all(|p| p.files.is_empty()));
    }

    #[test]
    fn packages_keep_merge_order_and_files() {
        let mut packages = PackageMap::new();
        let (xz_key, xz) = conda_package("xz", "defaults", "u");
        packages.insert(xz_key.clone(), xz);
        let mut rpaths = PackageDetails::new("rpaths");
        rpaths.installer = Some("pip".to_string());
        packages.insert(PackageKey::named("rpaths"), rpaths);
        let mut files = HashMap::new();
        files.insert(xz_key, vec![PathBuf::from("bin/xz")]);
        let mut unknown = UnknownFiles::new();

        let env = assemble(
            Path::new("/opt/conda/envs/py3"),
            Path::new("/opt/conda"),
            packages,
            files,
            &mut unknown,
            &MockReporter::new(),
        );

        let names: Vec<_> = env.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["xz", "rpaths"]);
        assert_eq!(env.packages[0].files, vec![PathBuf::from("bin/xz")]);
        assert_eq!(env.packages[1].installer.as_deref(), Some("pip"));
        assert_eq!(env.channels.len(), 1);
    }

    #[test]
    fn external_locations_become_unknown() {
        let mut packages = PackageMap::new();
        let mut outside = PackageDetails::new("nmtest");
        outside.location = Some(PathBuf::from("/home/dev/nmtest"));
        outside.editable = true;
        let mut inside = PackageDetails::new("rpaths");
        inside.location = Some(PathBuf::from("/opt/conda/envs/py3/lib/site-packages"));
        packages.insert(PackageKey::named("nmtest"), outside);
        packages.insert(PackageKey::named("rpaths"), inside);
        let mut unknown = UnknownFiles::new();
        let reporter = MockReporter::new();

        let env = assemble(
            Path::new("/opt/conda/envs/py3"),
            Path::new("/opt/conda"),
            packages,
            HashMap::new(),
            &mut unknown,
            &reporter,
        );

        assert_eq!(unknown, [PathBuf::from("/home/dev/nmtest")].into_iter().collect());
        assert!(env.packages[0].editable);
        assert_eq!(reporter.debugs().len(), 1);
    }
}
