//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands write their report to an
//! injected writer and log diagnostics through `tracing`.

pub mod dispatcher;
pub mod display;
pub mod trace;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use display::{render, Theme, TraceReport};
pub use trace::{trace_files, TraceCommand};
