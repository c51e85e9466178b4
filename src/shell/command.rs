//! Shell command execution.

use crate::error::{Result, TraceError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,
}

/// Execute a command line through `/bin/sh -c`, capturing both streams.
///
/// A non-zero exit is reported through [`CommandResult::success`], not as an
/// error. Errors are returned only when the shell cannot be spawned.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let mut cmd = Command::new(SHELL);
    cmd.arg("-c").arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

/// Execute a command and convert a non-zero exit into [`TraceError::CommandFailed`].
pub fn execute_checked(command: &str, cwd: Option<&Path>) -> Result<CommandResult> {
    let options = CommandOptions {
        cwd: cwd.map(Path::to_path_buf),
    };
    let result = execute(command, &options)?;
    if result.success {
        Ok(result)
    } else {
        Err(TraceError::CommandFailed {
            command: command.to_string(),
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        })
    }
}

/// Quote a single shell word.
///
/// Words made only of characters the shell never interprets are returned
/// unchanged, so common paths stay readable in logs.
pub fn quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:@%,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Quote a path as a single shell word.
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

const SHELL: &str = "/bin/sh";
