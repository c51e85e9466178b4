//! Diagnostics reporting.
//!
//! Discovery code never logs through a global. Every component receives a
//! [`Reporter`] and sends it [`Diagnostic`]s:
//!
//! - [`TracingReporter`] forwards them to `tracing` (used by the CLI)
//! - [`MockReporter`] captures them for assertions in tests
//!
//! # Example
//!
//! ```
//! use envtrace::report::{MockReporter, Reporter};
//!
//! let reporter = MockReporter::new();
//! reporter.warning("Could not retrieve conda info in path /opt/conda");
//! assert_eq!(reporter.warnings().len(), 1);
//! ```

pub mod mock;

pub use mock::MockReporter;

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A message emitted while tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for diagnostics.
pub trait Reporter {
    /// Record a diagnostic.
    fn report(&self, diagnostic: Diagnostic);

    fn debug(&self, message: &str) {
        self.report(Diagnostic::new(Level::Debug, message));
    }

    fn warning(&self, message: &str) {
        self.report(Diagnostic::new(Level::Warning, message));
    }
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.level {
            Level::Debug => tracing::debug!("{}", diagnostic.message),
            Level::Warning => tracing::warn!("{}", diagnostic.message),
        }
    }
}
