// src/cli/handlers/load.rs

use anyhow::Result;

use super::commons::Session;
use crate::error::SclError;

/// `scl load|unload`: these change the caller's own shell and only work
/// through the `scl` shell function, never through the binary.
pub fn handle(_args: Vec<String>, _session: &Session) -> Result<i32> {
    Err(SclError::Config(t!("load.error.shell_function").to_string()).into())
}
