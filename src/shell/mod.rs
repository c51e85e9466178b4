//! Shell command execution.

pub mod command;

pub use command::{execute, execute_checked, quote, quote_path, CommandOptions, CommandResult};
