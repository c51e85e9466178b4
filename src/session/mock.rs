//! In-memory session for testing.
//!
//! `MockSession` serves a fake file tree and records every command and
//! existence probe for later assertion. It understands the two commands the
//! conda tracer issues against the filesystem (`cat <file>` and
//! `ls <dir>/*.json`); anything else must be scripted with
//! [`MockSession::with_response`] or [`MockSession::with_failure`].
//!
//! # Example
//!
//! ```
//! use envtrace::session::{MockSession, Session};
//!
//! let session = MockSession::new()
//!     .with_file("/env/conda-meta/xz-5.2-0.json", "{}")
//!     .with_response("/env/bin/conda info --json", "{\"platform\": \"linux-64\"}");
//!
//! let out = session.execute("ls /env/conda-meta/*.json").unwrap();
//! assert_eq!(out.stdout.trim(), "/env/conda-meta/xz-5.2-0.json");
//! assert_eq!(session.executed().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};

use super::{ExecOutput, Session};

#[derive(Debug, Clone)]
enum Scripted {
    Output(String),
    Failure { code: Option<i32>, stderr: String },
}

/// Fake session over an in-memory file tree.
#[derive(Debug, Default)]
pub struct MockSession {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    responses: HashMap<String, Scripted>,
    executed: RefCell<Vec<String>>,
    probes: RefCell<Vec<PathBuf>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; all of its ancestors exist implicitly.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Add an (empty) directory.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    /// Script the stdout of an exact command line.
    pub fn with_response(mut self, command: &str, stdout: impl Into<String>) -> Self {
        self.responses
            .insert(command.to_string(), Scripted::Output(stdout.into()));
        self
    }

    /// Script a failing exact command line.
    pub fn with_failure(mut self, command: &str, code: Option<i32>, stderr: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            Scripted::Failure {
                code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Commands executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Paths passed to [`Session::exists`] so far, in order.
    pub fn probes(&self) -> Vec<PathBuf> {
        self.probes.borrow().clone()
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.keys().any(|f| f.starts_with(path))
            || self.dirs.iter().any(|d| d.starts_with(path))
    }

    fn cat(&self, command: &str, arg: &str) -> Result<ExecOutput> {
        let path = PathBuf::from(unquote(arg));
        match self.files.get(&path) {
            Some(content) => Ok(ExecOutput::new(content.clone())),
            None => Err(failure(
                command,
                Some(1),
                format!("cat: {}: No such file or directory", path.display()),
            )),
        }
    }

    fn ls_json(&self, command: &str, arg: &str) -> Result<ExecOutput> {
        let pattern = unquote(arg);
        let Some(dir) = pattern.strip_suffix("/*.json") else {
            return Err(failure(command, Some(2), format!("ls: unsupported pattern {pattern}")));
        };
        let dir = Path::new(dir);
        let listed: Vec<String> = self
            .files
            .keys()
            .filter(|f| f.parent() == Some(dir))
            .filter(|f| f.extension().is_some_and(|ext| ext == "json"))
            .map(|f| f.to_string_lossy().to_string())
            .collect();
        if listed.is_empty() {
            return Err(failure(
                command,
                Some(2),
                format!("ls: cannot access '{pattern}': No such file or directory"),
            ));
        }
        Ok(ExecOutput::new(listed.join("\n") + "\n"))
    }
}

impl Session for MockSession {
    fn execute(&self, command: &str) -> Result<ExecOutput> {
        self.executed.borrow_mut().push(command.to_string());

        if let Some(scripted) = self.responses.get(command) {
            return match scripted {
                Scripted::Output(stdout) => Ok(ExecOutput::new(stdout.clone())),
                Scripted::Failure { code, stderr } => Err(failure(command, *code, stderr.clone())),
            };
        }

        match command.split_once(' ') {
            Some(("cat", arg)) => self.cat(command, arg),
            Some(("ls", arg)) => self.ls_json(command, arg),
            _ => Err(failure(command, Some(127), "command not found".to_string())),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.probes.borrow_mut().push(path.to_path_buf());
        self.path_exists(path)
    }
}

fn failure(command: &str, code: Option<i32>, stderr: String) -> TraceError {
    TraceError::CommandFailed {
        command: command.to_string(),
        code,
        stderr,
    }
}

/// Undo [`crate::shell::quote`] for a single word.
fn unquote(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut quoted = false;
    let mut chars = word.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => quoted = !quoted,
            '\\' if !quoted => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
