//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

/// envtrace - Attribute files to the package environments that installed them.
#[derive(Debug, Parser)]
#[command(name = "envtrace")]
#[command(
    author,
    version,
    about = "Attribute files to the package environments that installed them",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file laid over the discovered .envtrace.yml
    #[arg(short, long, global = true, env = "ENVTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Trace files to the distributions that own them
    Trace(TraceArgs),
}

/// Arguments for the `trace` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TraceArgs {
    /// Files to trace
    pub files: Vec<PathBuf>,

    /// Read additional paths, one per line, from a file (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    pub files_from: Option<PathBuf>,

    /// Output format (overrides settings.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}
