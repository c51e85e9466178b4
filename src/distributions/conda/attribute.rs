//! Claiming unknown files for the packages of one environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::distributions::details::{FileOwnership, PackageKey};
use crate::distributions::paths::relative_or_absolute;
use crate::distributions::UnknownFiles;

/// Move every file of `unknown` that `ownership` knows about to its owning
/// package.
///
/// Claimed files are removed from `unknown` and recorded relative to `env`
/// when they lie below it. File lists come out in path order.
pub fn attribute(
    unknown: &mut UnknownFiles,
    ownership: &FileOwnership,
    env: &Path,
) -> HashMap<PackageKey, Vec<PathBuf>> {
    let mut claimed: HashMap<PackageKey, Vec<PathBuf>> = HashMap::new();

    unknown.retain(|path| match ownership.get(path) {
        Some(key) => {
            claimed
                .entry(key.clone())
                .or_default()
                .push(relative_or_absolute(path, env));
            false
        }
        None => true,
    });

    claimed
}
