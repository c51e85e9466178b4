//! Session backed by the local machine.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::execute_checked;

use super::{ExecOutput, Session};

/// Runs commands on the local host.
#[derive(Debug, Clone, Default)]
pub struct LocalSession {
    cwd: Option<PathBuf>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from the given working directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl Session for LocalSession {
    fn execute(&self, command: &str) -> Result<ExecOutput> {
        tracing::trace!("executing: {}", command);
        let result = execute_checked(command, self.cwd.as_deref())?;
        Ok(ExecOutput {
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
