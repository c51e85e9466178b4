//! Memoized search for enclosing roots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Finds the nearest ancestor of a path that satisfies a predicate.
///
/// The answer for every directory visited during a search is cached, so
/// sibling files under the same tree cost at most one predicate call per
/// distinct ancestor. Predicates usually probe the session, which may be
/// remote.
///
/// The walk starts at the path itself and stops before the filesystem root,
/// which is never probed.
///
/// # Example
///
/// ```
/// use envtrace::distributions::RootFinder;
/// use std::path::Path;
///
/// let mut finder = RootFinder::new();
/// let root = finder.find(Path::new("/opt/conda/bin/python"), |p| p.ends_with("conda"));
/// assert_eq!(root.as_deref(), Some(Path::new("/opt/conda")));
/// ```
#[derive(Debug, Default)]
pub struct RootFinder {
    cache: HashMap<PathBuf, Option<PathBuf>>,
}

impl RootFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest ancestor of `path` (inclusive) for which `predicate` holds.
    pub fn find<F>(&mut self, path: &Path, mut predicate: F) -> Option<PathBuf>
    where
        F: FnMut(&Path) -> bool,
    {
        let mut visited = Vec::new();
        let mut result = None;
        let mut current = Some(path);

        while let Some(candidate) = current {
            if candidate.parent().is_none() || candidate.as_os_str().is_empty() {
                break;
            }
            if let Some(cached) = self.cache.get(candidate) {
                result = cached.clone();
                break;
            }
            visited.push(candidate.to_path_buf());
            if predicate(candidate) {
                result = Some(candidate.to_path_buf());
                break;
            }
            current = candidate.parent();
        }

        for dir in visited {
            self.cache.insert(dir, result.clone());
        }
        result
    }

    /// Number of directories with a cached answer.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
