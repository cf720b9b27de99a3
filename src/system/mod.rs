//! # System Interaction Layer
//!
//! The boundary between the activation engine and the operating system. Nothing
//! outside this module spawns a process or replaces the current one.
//!
//! ## Modules
//!
//! - **`executor`**: spawns external programs, captures their output and maps
//!   exit statuses, including in-place process replacement.
//! - **`module_tool`**: the `ModuleTool` seam over the environment-module
//!   command, with the real `ModuleCmd` implementation.
//! - **`script`**: writes the activation script to a unique temporary file and
//!   runs it in a child shell or by replacing the process.

/// Running external programs.
pub mod executor;
/// The environment-module tool.
pub mod module_tool;
/// Writing and running the activation script.
pub mod script;
