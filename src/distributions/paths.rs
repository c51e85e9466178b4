//! Lexical path helpers.
//!
//! Paths inspected by a tracer may live on another machine, so nothing here
//! touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically, collapsing `.` and `..` components.
///
/// `..` at the root is dropped; leading `..` of a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Whether `path` is `dir` or lies below it, after normalization.
pub fn is_subpath(path: &Path, dir: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(dir))
}

/// `path` relative to `base` when it is a descendant, otherwise `path` itself.
pub fn relative_or_absolute(path: &Path, base: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path.to_path_buf(),
    }
}
