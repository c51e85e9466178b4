//! Secondary-installer metadata lookup.
//!
//! A conda environment can carry packages installed by pip on top of the
//! ones conda manages. The conda tracer learns their names from the
//! environment export and asks a [`SecondaryLookup`] for the details: version,
//! location, editable flag and owned files.
//!
//! [`PipLookup`] answers with two pip invocations:
//!
//! ```text
//! <env>/bin/pip list --editable --format=json
//! <env>/bin/pip show -f <name>...
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::report::Reporter;
use crate::session::Session;
use crate::shell::{quote, quote_path};

use super::details::{canonical_name, CollectedPackages, PackageDetails, PackageKey};
use super::paths::normalize_path;

/// Installer identifier recorded on pip-owned packages.
pub const PIP_INSTALLER: &str = "pip";

/// Looks up file-level details of packages owned by a secondary installer.
pub trait SecondaryLookup {
    /// Identifier stored in the `installer` field of found packages.
    fn installer(&self) -> &str;

    /// Path of the installer's executable inside an environment.
    fn tool_path(&self, env_path: &Path) -> PathBuf;

    /// Collect details for `names`, keyed by bare package name.
    ///
    /// Best-effort: failures are reported and yield fewer packages.
    fn lookup(
        &self,
        session: &dyn Session,
        tool: &Path,
        names: &[String],
        reporter: &dyn Reporter,
    ) -> CollectedPackages;
}

/// [`SecondaryLookup`] backed by `pip show`.
#[derive(Debug, Clone)]
pub struct PipLookup {
    batch_size: usize,
}

impl PipLookup {
    /// `batch_size` bounds how many names go into one `pip show` call.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    fn editable_names(
        &self,
        session: &dyn Session,
        tool: &Path,
        reporter: &dyn Reporter,
    ) -> HashSet<String> {
        let command = format!("{} list --editable --format=json", quote_path(tool));
        let listed = session.execute(&command).map_err(|e| e.to_string()).and_then(|out| {
            serde_json::from_str::<Vec<PipListEntry>>(&out.stdout).map_err(|e| e.to_string())
        });
        match listed {
            Ok(entries) => entries.iter().map(|e| canonical_name(&e.name)).collect(),
            Err(e) => {
                reporter.warning(&format!(
                    "Could not list editable pip packages with {}: {}",
                    tool.display(),
                    e
                ));
                HashSet::new()
            }
        }
    }
}

impl Default for PipLookup {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SecondaryLookup for PipLookup {
    fn installer(&self) -> &str {
        PIP_INSTALLER
    }

    fn tool_path(&self, env_path: &Path) -> PathBuf {
        env_path.join("bin").join("pip")
    }

    fn lookup(
        &self,
        session: &dyn Session,
        tool: &Path,
        names: &[String],
        reporter: &dyn Reporter,
    ) -> CollectedPackages {
        let mut collected = CollectedPackages::default();
        if names.is_empty() {
            return collected;
        }

        let editable = self.editable_names(session, tool, reporter);

        let mut entries = Vec::new();
        for batch in names.chunks(self.batch_size) {
            let args: Vec<String> = batch.iter().map(|n| quote(n)).collect();
            let command = format!("{} show -f {}", quote_path(tool), args.join(" "));
            match session.execute(&command) {
                Ok(out) => entries.extend(parse_pip_show(&out.stdout)),
                Err(e) => reporter.warning(&format!(
                    "Could not retrieve pip details for {}: {}",
                    batch.join(", "),
                    e
                )),
            }
        }

        for entry in entries {
            let key = PackageKey::named(&entry.name);
            if collected.packages.contains_key(&key) {
                continue;
            }

            for file in &entry.files {
                let Some(base) = &entry.location else { break };
                let full = normalize_path(&base.join(file));
                collected.files.entry(full).or_insert_with(|| key.clone());
            }

            let is_editable = entry.editable_location.is_some()
                || editable.contains(&canonical_name(&entry.name));
            let mut details = PackageDetails::new(entry.name);
            details.version = entry.version;
            details.location = entry.editable_location.or(entry.location);
            details.editable = is_editable;
            collected.packages.insert(key, details);
        }

        collected
    }
}

#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
}

/// One package block of `pip show -f` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipShowEntry {
    pub name: String,
    pub version: Option<String>,
    /// Directory the `Files:` entries are relative to.
    pub location: Option<PathBuf>,
    /// Source checkout of an editable install (pip >= 21.3).
    pub editable_location: Option<PathBuf>,
    pub files: Vec<String>,
}

/// Parse the output of `pip show -f`.
///
/// Blocks are separated by `---` lines. Entries without a `Name` are
/// dropped.
pub fn parse_pip_show(output: &str) -> Vec<PipShowEntry> {
    let mut entries = Vec::new();
    let mut current = PipShowEntry::default();
    let mut in_files = false;

    for line in output.lines() {
        if line.trim() == "---" {
            push_entry(&mut entries, std::mem::take(&mut current));
            in_files = false;
            continue;
        }
        if in_files && line.starts_with(' ') {
            let file = line.trim();
            if !file.is_empty() && !file.starts_with("Cannot locate") {
                current.files.push(file.to_string());
            }
            continue;
        }
        in_files = false;

        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match field.trim() {
            "Name" => {
                if !current.name.is_empty() {
                    push_entry(&mut entries, std::mem::take(&mut current));
                }
                current.name = value.to_string();
            }
            "Version" if !value.is_empty() => current.version = Some(value.to_string()),
            "Location" if !value.is_empty() => current.location = Some(PathBuf::from(value)),
            "Editable project location" if !value.is_empty() => {
                current.editable_location = Some(PathBuf::from(value))
            }
            "Files" => in_files = true,
            _ => {}
        }
    }
    push_entry(&mut entries, current);
    entries
}

fn push_entry(entries: &mut Vec<PipShowEntry>, entry: PipShowEntry) {
    if !entry.name.is_empty() {
        entries.push(entry);
    }
}
