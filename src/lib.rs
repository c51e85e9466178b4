//! envtrace - Trace files back to the package environments that own them.
//!
//! Given a set of absolute paths observed on a system, envtrace finds the
//! conda installations and environments enclosing them, reads the package
//! manifests (and the pip packages layered on top), and splits the set into
//! files attributed to a package and files nobody claimed.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`distributions`] - Tracers, distribution records and the retrace chain
//! - [`error`] - Error types and result aliases
//! - [`report`] - Diagnostics sinks handed to tracers
//! - [`session`] - Where commands run and paths are probed
//! - [`shell`] - Shell command execution and quoting
//!
//! # Example
//!
//! ```
//! use envtrace::distributions::{CondaTracer, UnknownFiles};
//! use envtrace::report::MockReporter;
//! use envtrace::session::MockSession;
//! use std::path::PathBuf;
//!
//! let session = MockSession::new()
//!     .with_dir("/opt/conda/bin")
//!     .with_dir("/opt/conda/envs")
//!     .with_file("/opt/conda/conda-meta/history", "");
//! let reporter = MockReporter::new();
//!
//! let files: UnknownFiles = [PathBuf::from("/etc/hosts")].into_iter().collect();
//! let found = CondaTracer::new(&session, &reporter).identify(&files);
//! assert!(found.is_empty());
//! ```

pub mod cli;
pub mod config;
pub mod distributions;
pub mod error;
pub mod report;
pub mod session;
pub mod shell;

pub use error::{Result, TraceError};
