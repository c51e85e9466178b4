//! Command-line interface for envtrace.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations and output rendering

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, TraceArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
