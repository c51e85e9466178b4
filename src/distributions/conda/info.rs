//! Installation metadata from `conda info --json`.

use std::path::Path;

use serde::Deserialize;

use crate::report::Reporter;
use crate::session::Session;
use crate::shell::quote_path;

/// The parts of `conda info --json` recorded on a distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CondaInfo {
    #[serde(default)]
    pub conda_version: Option<String>,
    #[serde(default)]
    pub python_version: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Query the installation at `root`. Failures are reported and give an
/// empty record.
pub fn conda_info(session: &dyn Session, root: &Path, reporter: &dyn Reporter) -> CondaInfo {
    let command = format!("{} info --json", quote_path(&root.join("bin").join("conda")));
    let parsed = session
        .execute(&command)
        .map_err(|e| e.to_string())
        .and_then(|out| serde_json::from_str::<CondaInfo>(&out.stdout).map_err(|e| e.to_string()));

    parsed.unwrap_or_else(|e| {
        reporter.warning(&format!(
            "Could not retrieve conda info in path {}: {}",
            root.display(),
            e
        ));
        CondaInfo::default()
    })
}

/// Conda's platform name for a Python `sys.platform` value.
pub fn conda_platform_from_python(sys_platform: &str) -> Option<&'static str> {
    const PLATFORMS: [(&str, &str); 5] = [
        ("darwin", "osx"),
        ("linux", "linux"),
        ("openbsd", "openbsd"),
        ("win", "win"),
        ("zos", "zos"),
    ];
    PLATFORMS
        .iter()
        .find(|(prefix, _)| sys_platform.starts_with(prefix))
        .map(|(_, name)| *name)
}
