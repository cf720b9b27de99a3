//! # Collection registries
//!
//! A collection can be known to the legacy pointer-file registry, to the
//! module-tool registry, or to both. Both implement [`Registry`]; the engine
//! walks them in a fixed order and the first one that knows a name wins.

use std::path::{Path, PathBuf};

use crate::core::env_diff::EnvVarDelta;
use crate::core::environment::Environment;
use crate::error::{Result, SclError};

/// Pointer-file registry.
pub mod legacy;
/// Environment-module registry.
pub mod module;

pub use legacy::LegacyRegistry;
pub use module::ModuleRegistry;

/// Which registry a collection was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// Pointer file under the configuration directory plus an `enable` scriptlet.
    Legacy,
    /// Module file served by the environment-module tool.
    Module,
}

/// What the activation script has to do for a resolved collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Source this scriptlet.
    Source(PathBuf),
    /// Export these assignments, in order.
    Apply(EnvVarDelta),
}

/// Where a collection lives and how to activate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Collection name as requested.
    pub name: String,
    /// Installation root.
    pub path: PathBuf,
    /// Whether `path` is present on disk. Registry entries can be stale.
    pub exists: bool,
    /// Registry that answered.
    pub kind: RegistryKind,
    /// Activation step for the script.
    pub activation: Activation,
}

impl Resolution {
    /// Builds a resolution, probing the disk for `path`.
    pub fn new(name: &str, path: PathBuf, kind: RegistryKind, activation: Activation) -> Self {
        let exists = path.exists();
        Self {
            name: name.to_string(),
            path,
            exists,
            kind,
            activation,
        }
    }

    /// Checks that the collection can actually be activated: its root is a
    /// directory with the expected layout, and a legacy collection's
    /// scriptlet is present.
    pub fn ensure_usable(&self) -> Result<()> {
        if !self.exists {
            return Err(SclError::Config(format!(
                "Collection '{}' is registered at '{}', which does not exist.",
                self.name,
                self.path.display()
            )));
        }
        if !self.path.is_dir() {
            return Err(SclError::Config(format!(
                "Collection path '{}' is not a directory.",
                self.path.display()
            )));
        }
        if !is_valid_collection_dir(&self.path, &self.name) {
            return Err(SclError::Config(format!(
                "Collection '{}' at '{}' is incomplete: it needs '{}' and either '{}' or '{}'.",
                self.name,
                self.path.display(),
                crate::constants::ROOT_DIR,
                crate::constants::ENABLE_SCRIPTLET,
                self.name
            )));
        }
        if let Activation::Source(scriptlet) = &self.activation
            && !scriptlet.is_file()
        {
            return Err(SclError::Config(format!(
                "Scriptlet '{}' of collection '{}' does not exist.",
                scriptlet.display(),
                self.name
            )));
        }
        Ok(())
    }
}

/// One source of collections.
pub trait Registry {
    /// Which registry this is.
    fn kind(&self) -> RegistryKind;

    /// Locates `name`. `Ok(None)` means this registry does not know it.
    fn resolve_path(&self, name: &str) -> Result<Option<Resolution>>;

    /// Every collection this registry can offer.
    fn list_available(&self) -> Result<Vec<String>>;

    /// Collections this registry's marker variable reports as active.
    fn enabled(&self, env: &Environment) -> Vec<String>;

    /// Whether `name` is already active according to this registry.
    fn is_enabled(&self, name: &str, env: &Environment) -> bool {
        self.enabled(env).iter().any(|enabled| enabled == name)
    }
}

/// `root` plus an `enable` scriptlet or a module file named after the collection.
pub fn is_valid_collection_dir(path: &Path, name: &str) -> bool {
    path.join(crate::constants::ROOT_DIR).exists()
        && (path.join(crate::constants::ENABLE_SCRIPTLET).exists() || path.join(name).exists())
}
