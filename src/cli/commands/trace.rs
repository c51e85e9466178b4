//! Trace command implementation.
//!
//! The `envtrace trace` command attributes the given files to the
//! distributions installed on this machine and prints the result.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::cli::args::TraceArgs;
use crate::config::{load_config, CondaSettings};
use crate::distributions::{
    identify_distributions, normalize_path, CondaTracer, DistributionTracer, TraceOutcome,
    UnknownFiles,
};
use crate::error::Result;
use crate::report::{Reporter, TracingReporter};
use crate::session::{LocalSession, Session};

use super::dispatcher::{Command, CommandResult};
use super::display::{render, Theme};

/// The trace command implementation.
pub struct TraceCommand {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    args: TraceArgs,
}

impl TraceCommand {
    /// Create a new trace command.
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>, args: TraceArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config_path,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &TraceArgs {
        &self.args
    }

    /// Paths to trace, absolute and normalized.
    ///
    /// Relative paths are taken relative to the working directory.
    pub fn input_files(&self) -> Result<UnknownFiles> {
        let mut paths = self.args.files.clone();
        if let Some(source) = &self.args.files_from {
            paths.extend(self.read_file_list(source)?);
        }

        Ok(paths
            .iter()
            .map(|p| normalize_path(&self.working_dir.join(p)))
            .collect())
    }

    fn read_file_list(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let content = if source == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            fs::read_to_string(self.working_dir.join(source))?
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

impl Command for TraceCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let explicit = self.config_path.as_ref().map(|p| self.working_dir.join(p));
        let config = load_config(&self.working_dir, explicit.as_deref())?;

        let files = self.input_files()?;
        if files.is_empty() {
            tracing::error!("No files to trace. Pass paths or --files-from.");
            return Ok(CommandResult::failure(2));
        }
        tracing::debug!("tracing {} files", files.len());

        let session = LocalSession::with_cwd(&self.working_dir);
        let reporter = TracingReporter;
        let outcome = trace_files(&session, &reporter, &config.conda, &files);

        let format = self.args.format.unwrap_or(config.settings.format);
        render(&outcome, format, &Theme::new(), out)?;

        Ok(CommandResult::success())
    }
}

/// Run every available tracer over `files`.
pub fn trace_files(
    session: &dyn Session,
    reporter: &dyn Reporter,
    settings: &CondaSettings,
    files: &UnknownFiles,
) -> TraceOutcome {
    let mut tracers: Vec<Box<dyn DistributionTracer + '_>> = vec![Box::new(
        CondaTracer::with_settings(session, reporter, settings.clone()),
    )];
    identify_distributions(&mut tracers, files, reporter)
}
