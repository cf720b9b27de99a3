// src/system/module_tool.rs

use std::path::PathBuf;

use crate::error::Result;
use crate::system::executor;

pub use crate::system::executor::OutputStream;

/// The narrow seam between the engine and the environment-module tool.
///
/// Implementations run one request and hand back the raw text of the chosen
/// stream; parsing lives in [`crate::core::env_diff`].
pub trait ModuleTool {
    /// Runs the tool with `args` and returns what it printed on `stream`.
    fn query(&self, args: &[&str], stream: OutputStream) -> Result<String>;
}

/// The real module tool, run as a blocking child process.
#[derive(Debug, Clone)]
pub struct ModuleCmd {
    program: PathBuf,
    env_vars: Vec<(String, String)>,
}

impl ModuleCmd {
    /// `env_vars` are added to the tool's environment on every call; the engine
    /// uses this to hand over the augmented `MODULEPATH`.
    pub fn new(program: impl Into<PathBuf>, env_vars: Vec<(String, String)>) -> Self {
        Self {
            program: program.into(),
            env_vars,
        }
    }
}

impl ModuleTool for ModuleCmd {
    fn query(&self, args: &[&str], stream: OutputStream) -> Result<String> {
        Ok(executor::capture_output(
            &self.program,
            args,
            &self.env_vars,
            stream,
        )?)
    }
}
