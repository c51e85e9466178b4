//! Command execution sessions.
//!
//! Tracers never touch the filesystem or spawn processes directly. They go
//! through a [`Session`], which abstracts over where the inspected system
//! lives:
//!
//! - [`LocalSession`] runs commands on this machine via `/bin/sh`
//! - [`MockSession`] serves an in-memory file tree for tests
//!
//! Remote transports (ssh, containers) plug in by implementing the trait.
//!
//! # Example
//!
//! ```
//! use envtrace::session::{MockSession, Session};
//! use std::path::Path;
//!
//! let session = MockSession::new().with_file("/opt/conda/conda-meta/history", "");
//! assert!(session.exists(Path::new("/opt/conda/conda-meta")));
//! let out = session.execute("cat /opt/conda/conda-meta/history").unwrap();
//! assert!(out.stdout.is_empty());
//! ```

pub mod local;
pub mod mock;

pub use local::LocalSession;
pub use mock::MockSession;

use std::path::Path;

use crate::error::Result;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// A place where commands can be run and paths probed.
pub trait Session {
    /// Run a shell command line.
    ///
    /// Fails with [`TraceError::CommandFailed`](crate::TraceError::CommandFailed)
    /// on a non-zero exit and with an IO error when the transport fails.
    fn execute(&self, command: &str) -> Result<ExecOutput>;

    /// Whether a path exists in the session's filesystem.
    fn exists(&self, path: &Path) -> bool;
}

impl<S: Session + ?Sized> Session for &S {
    fn execute(&self, command: &str) -> Result<ExecOutput> {
        (**self).execute(command)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}
