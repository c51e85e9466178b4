//! Grouping environments into one distribution per conda root.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::distributions::UnknownFiles;
use crate::report::Reporter;
use crate::session::Session;

use super::info::conda_info;
use super::{CondaDistribution, CondaEnvironment};

/// `manager` for a single root, `manager-<index>` when there are several.
pub fn distribution_name(manager: &str, index: usize, total: usize) -> String {
    if total > 1 {
        format!("{}-{}", manager, index)
    } else {
        manager.to_string()
    }
}

/// One distribution per root, in root path order.
///
/// Every pair carries the same final `unknown` set.
pub fn group(
    session: &dyn Session,
    environments: BTreeMap<PathBuf, Vec<CondaEnvironment>>,
    unknown: &UnknownFiles,
    manager: &str,
    reporter: &dyn Reporter,
) -> Vec<(CondaDistribution, UnknownFiles)> {
    let total = environments.len();

    environments
        .into_iter()
        .enumerate()
        .map(|(index, (root, envs))| {
            let info = conda_info(session, &root, reporter);
            let dist = CondaDistribution {
                name: distribution_name(manager, index, total),
                path: root,
                conda_version: info.conda_version,
                python_version: info.python_version,
                platform: info.platform,
                environments: envs,
            };
            (dist, unknown.clone())
        })
        .collect()
}
