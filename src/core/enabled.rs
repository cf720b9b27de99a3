// src/core/enabled.rs

use crate::core::environment::Environment;
use crate::core::registry::{Registry, RegistryKind};
use crate::core::strings;

/// Collections already active in the caller's environment, as reported by each
/// registry's marker variable. Rebuilt on every invocation, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledSet {
    legacy: Vec<String>,
    module: Vec<String>,
}

impl EnabledSet {
    /// Asks every registry which collections its marker lists.
    pub fn collect(registries: &[&dyn Registry], env: &Environment) -> Self {
        let mut set = Self::default();
        for registry in registries {
            let names = registry.enabled(env);
            match registry.kind() {
                RegistryKind::Legacy => set.legacy.extend(names),
                RegistryKind::Module => set.module.extend(names),
            }
        }
        log::debug!(
            "Enabled collections: legacy={:?} module={:?}",
            set.legacy,
            set.module
        );
        set
    }

    /// True if either marker lists `name`.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.legacy.iter().chain(self.module.iter()).any(|n| n == name)
    }

    /// Sorted union of both markers, each name once.
    pub fn union(&self) -> Vec<String> {
        strings::merge_unique(&self.legacy, &self.module)
    }
}
