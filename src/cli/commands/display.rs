//! Rendering trace results.
//!
//! `json` and `yaml` serialize a [`TraceReport`]; `summary` is a short
//! human-readable listing styled with `console`.

use std::io::Write;
use std::path::PathBuf;

use console::Style;
use serde::Serialize;

use crate::config::OutputFormat;
use crate::distributions::{Distribution, TraceOutcome};
use crate::error::{Result, TraceError};

/// Styles used by the summary output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Distribution names (bold).
    pub header: Style,
    /// Secondary text such as paths and counts (dim).
    pub dim: Style,
    /// Installer tags on packages (magenta).
    pub installer: Style,
    /// The unknown-files heading (orange).
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            header: Style::new().bold(),
            dim: Style::new().dim(),
            installer: Style::new().magenta(),
            warning: Style::new().color256(208),
        }
    }

    /// Theme without any styling.
    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            dim: Style::new(),
            installer: Style::new(),
            warning: Style::new(),
        }
    }
}

/// Serializable document of a trace run.
#[derive(Debug, Serialize)]
pub struct TraceReport {
    pub distributions: Vec<serde_json::Value>,
    pub unknown_files: Vec<PathBuf>,
}

impl TraceReport {
    pub fn from_outcome(outcome: &TraceOutcome) -> Result<Self> {
        let distributions = outcome
            .distributions
            .iter()
            .map(|dist| distribution_value(dist.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            distributions,
            unknown_files: outcome.unknown_files.iter().cloned().collect(),
        })
    }
}

fn distribution_value(dist: &dyn Distribution) -> Result<serde_json::Value> {
    let mut value = dist.to_value().map_err(|e| TraceError::Other(e.into()))?;
    if let Some(fields) = value.as_object_mut() {
        fields.insert("kind".to_string(), dist.kind().into());
    }
    Ok(value)
}

/// Write `outcome` to `out` in `format`.
pub fn render(
    outcome: &TraceOutcome,
    format: OutputFormat,
    theme: &Theme,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = TraceReport::from_outcome(outcome)?;
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| TraceError::Other(e.into()))?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Yaml => {
            let report = TraceReport::from_outcome(outcome)?;
            let yaml = serde_yaml::to_string(&report).map_err(|e| TraceError::Other(e.into()))?;
            write!(out, "{}", yaml)?;
        }
        OutputFormat::Summary => write_summary(outcome, theme, out)?,
    }
    Ok(())
}

fn write_summary(outcome: &TraceOutcome, theme: &Theme, out: &mut dyn Write) -> Result<()> {
    for dist in &outcome.distributions {
        let path = dist
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{} {} {}",
            theme.header.apply_to(dist.name()),
            theme.dim.apply_to(format!("[{}]", dist.kind())),
            path
        )?;

        for pkg in dist.packages() {
            let mut line = format!("  {}", pkg.name());
            if let Some(version) = pkg.version() {
                line.push(' ');
                line.push_str(version);
            }
            if let Some(installer) = pkg.installer() {
                let tag = format!("[{}]", installer);
                line.push_str(&format!(" {}", theme.installer.apply_to(tag)));
            }
            let count = pkg.files().len();
            if count > 0 {
                let noun = if count == 1 { "file" } else { "files" };
                let files = format!("({} {})", count, noun);
                line.push_str(&format!(" {}", theme.dim.apply_to(files)));
            }
            writeln!(out, "{}", line)?;
        }
    }

    let unknown = &outcome.unknown_files;
    if !unknown.is_empty() {
        let noun = if unknown.len() == 1 { "file" } else { "files" };
        writeln!(
            out,
            "{}",
            theme.warning.apply_to(format!("{} unknown {}", unknown.len(), noun))
        )?;
        for path in unknown {
            writeln!(out, "  {}", path.display())?;
        }
    }
    Ok(())
}
