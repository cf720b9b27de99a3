// src/core/registry/module.rs

use std::cell::RefCell;
use std::path::PathBuf;

use super::{Activation, Registry, RegistryKind, Resolution};
use crate::constants::{COLPATH_VAR, LOADED_MODULE_FILES};
use crate::core::env_diff;
use crate::core::environment::Environment;
use crate::core::strings;
use crate::error::{Result, SclError};
use crate::system::module_tool::ModuleTool;

/// Collections registered with the environment-module tool.
///
/// The avail listing is fetched at most once per instance, since one
/// invocation may ask about several collections.
pub struct ModuleRegistry<'t> {
    tool: &'t dyn ModuleTool,
    modules_path: String,
    avail: RefCell<Option<Vec<String>>>,
}

impl std::fmt::Debug for ModuleRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules_path", &self.modules_path)
            .field("avail", &self.avail)
            .finish_non_exhaustive()
    }
}

impl<'t> ModuleRegistry<'t> {
    /// Registry of the modules `tool` lists under `modules_path`.
    pub fn new(tool: &'t dyn ModuleTool, modules_path: &str) -> Self {
        Self {
            tool,
            modules_path: strings::strip_trailing_slashes(modules_path).to_string(),
            avail: RefCell::new(None),
        }
    }

    /// Memoized `-t avail` answer restricted to the collection search path.
    fn available(&self) -> Result<Vec<String>> {
        if let Some(cached) = self.avail.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let names = env_diff::get_available_modules(self.tool, &self.modules_path)?;
        log::debug!("Module registry offers {} collection(s).", names.len());
        *self.avail.borrow_mut() = Some(names.clone());
        Ok(names)
    }

    /// Whether the module tool lists `name` under the collection search path.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.available()?.iter().any(|n| n == name))
    }
}

/// Names in the module marker: colon-delimited module-file paths, of which
/// only those directly under `modules_path` are collections.
pub fn enabled_from_marker(value: Option<&str>, modules_path: &str) -> Vec<String> {
    let prefix = format!("{}/", strings::strip_trailing_slashes(modules_path));
    value
        .map(|v| {
            strings::split_words(v, ':')
                .into_iter()
                .filter_map(|entry| entry.strip_prefix(&prefix))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Registry for ModuleRegistry<'_> {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Module
    }

    /// Locates `name` through the `COLPATH` variable its module sets.
    ///
    /// Names the tool does not list are `Ok(None)`. A listed module without
    /// `COLPATH` is a configuration error.
    fn resolve_path(&self, name: &str) -> Result<Option<Resolution>> {
        if !self.contains(name)? {
            return Ok(None);
        }
        let delta = env_diff::get_env_vars(self.tool, name)?;
        let colpath = delta.get(COLPATH_VAR).map(str::to_string).ok_or_else(|| {
            SclError::Config(format!(
                "Collection '{}' does not define the {} variable.",
                name, COLPATH_VAR
            ))
        })?;
        log::debug!("Module registry: '{}' -> {}", name, colpath);
        Ok(Some(Resolution::new(
            name,
            PathBuf::from(colpath),
            RegistryKind::Module,
            Activation::Apply(delta),
        )))
    }

    fn list_available(&self) -> Result<Vec<String>> {
        self.available()
    }

    fn enabled(&self, env: &Environment) -> Vec<String> {
        enabled_from_marker(env.get(LOADED_MODULE_FILES), &self.modules_path)
    }
}
