//! # scl
//!
//! Runs a command with one or more Software Collections activated. Collections
//! come from two registries: legacy pointer files under the configuration
//! directory, and module files served by the environment-module tool.
//!
//! The library is split the same way the binary thinks about the problem:
//!
//! - [`core`] holds the pure logic: parsing tool output, resolving collections,
//!   tracking which ones are enabled and building the activation script.
//! - [`system`] is the only place that spawns processes or replaces the current
//!   process image.
//! - [`cli`] turns command-line arguments into calls on the two above.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared flag raised by the Ctrl+C handler while a child command is running.
pub type CancellationToken = Arc<AtomicBool>;

/// Command-line front end: argument parsing, dispatch and action handlers.
pub mod cli;
/// Default paths, tool names and variable names.
pub mod constants;
/// Resolution, tracking and script building, free of process spawning.
pub mod core;
/// Error taxonomy and exit codes.
pub mod error;
/// Process spawning and replacement.
pub mod system;

pub use error::{Result, SclError};
