// src/cli/handlers/commons.rs

// Shared state and helpers for the action handlers.

use crate::CancellationToken;
use crate::constants::MODULEPATH;
use crate::core::config::SclConfig;
use crate::core::engine::Engine;
use crate::core::environment::Environment;
use crate::core::registry::{LegacyRegistry, ModuleRegistry};
use crate::error::{Result, SclError};
use crate::system::module_tool::ModuleCmd;

/// Everything a handler needs from the outside world, captured once in `main`.
#[derive(Debug, Clone)]
pub struct Session {
    /// Installation paths and tools.
    pub config: SclConfig,
    /// The caller's environment.
    pub env: Environment,
    /// Raised by the Ctrl+C handler.
    pub cancellation_token: CancellationToken,
}

impl Session {
    /// Bundles what `main` gathered.
    pub fn new(config: SclConfig, env: Environment, cancellation_token: CancellationToken) -> Self {
        Self {
            config,
            env,
            cancellation_token,
        }
    }

    /// `MODULEPATH` as the module tool and the activation shell will see it.
    pub fn module_path(&self) -> String {
        self.env.module_path_with(&self.config.modules_path_str())
    }

    /// Builds both registries, legacy first, and hands an engine over them to `f`.
    pub fn with_engine<T>(
        &self,
        f: impl FnOnce(&Engine<'_>, &LegacyRegistry) -> Result<T>,
    ) -> Result<T> {
        let modules_path = self.config.modules_path_str();
        let tool = ModuleCmd::new(
            &self.config.module_cmd,
            vec![(MODULEPATH.to_string(), self.module_path())],
        );
        let legacy = LegacyRegistry::new(&self.config.conf_dir);
        let module = ModuleRegistry::new(&tool, &modules_path);
        let engine = Engine::new(&[&legacy, &module], &modules_path);
        f(&engine, &legacy)
    }
}

/// Fails when an action that takes no arguments was given some.
pub fn expect_no_args(action: &str, args: &[String]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(SclError::Input(format!(
            t!("cli.error.unexpected_args"),
            action = action,
            args = args.join(" ")
        )))
    }
}
