// src/core/engine.rs

//! Resolution and planning.
//!
//! [`Engine::prepare`] turns a list of collection names and a command into an
//! [`ActivationPlan`]: the script to run plus a record of what it will do. No
//! process is started here; a plan that fails to build leaves nothing behind.

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{ENABLED_MARKER, MODULEPATH};
use crate::core::enabled::EnabledSet;
use crate::core::env_diff::EnvVar;
use crate::core::environment::Environment;
use crate::core::registry::{Activation, Registry, Resolution};
use crate::core::script::{ActivationScript, is_exportable};
use crate::core::strings;
use crate::error::{Result, SclError};

lazy_static! {
    static ref COLLECTION_NAME: Regex = Regex::new(r"^[^=\s/]+$").expect("valid regex");
}

/// Rejects names that could never be a collection: empty, or containing `=`,
/// whitespace or `/`.
pub fn validate_name(name: &str) -> Result<()> {
    if COLLECTION_NAME.is_match(name) {
        Ok(())
    } else {
        Err(SclError::Input(format!("Invalid collection name '{}'.", name)))
    }
}

/// What happened to one requested collection while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Already active in the caller's environment, or requested twice.
    Skipped,
    /// Will be activated by the script.
    Activated,
}

/// Record of one planning pass: which collections are activated or skipped,
/// and the environment assignments the script will perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationContext {
    enabled: EnabledSet,
    states: Vec<(String, ActivationState)>,
    assignments: Vec<EnvVar>,
    module_path: String,
}

impl ActivationContext {
    fn new(enabled: EnabledSet, module_path: String) -> Self {
        Self {
            enabled,
            states: Vec::new(),
            assignments: Vec::new(),
            module_path,
        }
    }

    /// Records an assignment. A later write to the same name replaces the
    /// earlier value but keeps its position.
    fn assign(&mut self, var: EnvVar) {
        match self.assignments.iter_mut().find(|a| a.name == var.name) {
            Some(existing) => existing.value = var.value,
            None => self.assignments.push(var),
        }
    }

    fn mark(&mut self, name: &str, state: ActivationState) {
        self.states.push((name.to_string(), state));
    }

    fn is_activated(&self, name: &str) -> bool {
        self.states
            .iter()
            .any(|(n, s)| n == name && *s == ActivationState::Activated)
    }

    /// Collections the script activates, in request order.
    pub fn activated(&self) -> Vec<&str> {
        self.names_in(ActivationState::Activated)
    }

    /// Collections left alone because they were already active.
    pub fn skipped(&self) -> Vec<&str> {
        self.names_in(ActivationState::Skipped)
    }

    fn names_in(&self, state: ActivationState) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, s)| *s == state)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Value the script leaves in `name`, if it assigns it.
    pub fn assigned(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Collections enabled once the script has run: those enabled before plus
    /// everything activated, sorted, each once.
    pub fn enabled_after(&self) -> Vec<String> {
        strings::merge_unique(&self.enabled.union(), &self.activated())
    }

    /// Variables handed to the shell process itself, before the script runs.
    pub fn process_env(&self) -> Vec<(String, String)> {
        vec![(MODULEPATH.to_string(), self.module_path.clone())]
    }
}

/// A script ready to run and the record of what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPlan {
    /// Script text builder.
    pub script: ActivationScript,
    /// What the script does.
    pub context: ActivationContext,
}

/// Resolves collections across registries in precedence order.
pub struct Engine<'r> {
    registries: Vec<&'r dyn Registry>,
    modules_path: String,
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.registries.iter().map(|r| r.kind()).collect();
        f.debug_struct("Engine")
            .field("registries", &kinds)
            .field("modules_path", &self.modules_path)
            .finish()
    }
}

impl<'r> Engine<'r> {
    /// `registries` are consulted in the given order; the first that knows a
    /// name wins.
    pub fn new(registries: &[&'r dyn Registry], modules_path: &str) -> Self {
        Self {
            registries: registries.to_vec(),
            modules_path: strings::strip_trailing_slashes(modules_path).to_string(),
        }
    }

    /// Finds `name` in the first registry that knows it.
    pub fn resolve(&self, name: &str) -> Result<Resolution> {
        validate_name(name)?;
        for registry in &self.registries {
            if let Some(resolution) = registry.resolve_path(name)? {
                log::debug!("'{}' resolved by the {:?} registry.", name, resolution.kind);
                return Ok(resolution);
            }
        }
        Err(SclError::Config(format!(
            "Collection '{}' is not registered.",
            name
        )))
    }

    /// Collections active in `env`.
    pub fn enabled(&self, env: &Environment) -> EnabledSet {
        EnabledSet::collect(&self.registries, env)
    }

    /// Every collection any registry offers, sorted, each once.
    pub fn list_available(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for registry in &self.registries {
            names = strings::merge_unique(&names, &registry.list_available()?);
        }
        Ok(names)
    }

    /// Plans the activation of `collections` followed by `command`.
    ///
    /// Collections already active in `env`, or requested twice, are skipped.
    /// Every remaining collection must resolve to a usable installation; the
    /// first that does not aborts planning with its error.
    pub fn prepare(
        &self,
        collections: &[String],
        command: &str,
        env: &Environment,
    ) -> Result<ActivationPlan> {
        if command.trim().is_empty() {
            return Err(SclError::Input("No command specified.".to_string()));
        }

        let enabled = self.enabled(env);
        let mut context =
            ActivationContext::new(enabled.clone(), env.module_path_with(&self.modules_path));
        let mut script = ActivationScript::new();

        for name in collections {
            validate_name(name)?;
            if enabled.is_enabled(name) || context.is_activated(name) {
                log::info!("Collection '{}' is already enabled; skipping.", name);
                context.mark(name, ActivationState::Skipped);
                continue;
            }

            let resolution = self.resolve(name)?;
            resolution.ensure_usable()?;

            script.track(name)?;
            match &resolution.activation {
                Activation::Source(scriptlet) => script.source(scriptlet)?,
                Activation::Apply(delta) => {
                    for var in delta.vars() {
                        // Aliases and functions also come out as `lhs=rhs`.
                        if !is_exportable(&var.name) {
                            log::warn!(
                                "Collection '{}': ignoring '{}', which is not a variable.",
                                name,
                                var.name
                            );
                            continue;
                        }
                        script.export(var)?;
                        context.assign(var.clone());
                    }
                }
            }
            context.mark(name, ActivationState::Activated);
            log::info!(
                "Activating '{}' from {}.",
                name,
                resolution.path.display()
            );
        }

        let activated = context.activated().join(" ");
        if !activated.is_empty() {
            let previous = env.get(ENABLED_MARKER).unwrap_or_default().trim_end();
            let marker = if previous.is_empty() {
                activated
            } else {
                format!("{} {}", previous, activated)
            };
            context.assign(EnvVar::new(ENABLED_MARKER, marker));
        }

        script.set_command(command);
        Ok(ActivationPlan { script, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{LegacyRegistry, ModuleRegistry, RegistryKind};
    use crate::system::module_tool::testing::FakeModuleTool;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    /// A throwaway installation: a legacy configuration directory and a prefix
    /// holding collection directories.
    struct Fixture {
        conf: TempDir,
        prefix: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                conf: tempdir().unwrap(),
                prefix: tempdir().unwrap(),
            }
        }

        fn collection_dir(&self, name: &str) -> std::path::PathBuf {
            let dir = self.prefix.path().join(name);
            fs::create_dir_all(dir.join("root")).unwrap();
            dir
        }

        fn legacy(&self, name: &str) {
            let dir = self.collection_dir(name);
            fs::write(dir.join("enable"), "export LEGACY=1\n").unwrap();
            fs::write(
                self.conf.path().join(name),
                format!("{}\n", self.prefix.path().display()),
            )
            .unwrap();
        }

        fn module_output(&self, name: &str) -> String {
            let dir = self.collection_dir(name);
            fs::write(dir.join(name), "#%Module1.0\n").unwrap();
            format!(
                "COLPATH={} ;export COLPATH;PATH={}/root/usr/bin:/usr/bin ;export PATH;",
                dir.display(),
                dir.display()
            )
        }
    }

    fn avail(names: &[&str]) -> String {
        format!("/etc/scl/modulefiles:\n{}\n", names.join("\n"))
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("rh-python38").is_ok());
        for bad in ["", "a=b", "a b", "a/b", "tab\tbed"] {
            assert!(matches!(validate_name(bad), Err(SclError::Input(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_legacy_registry_takes_precedence() {
        let fx = Fixture::new();
        fx.legacy("both");
        let tool = FakeModuleTool::new()
            .with_avail(&avail(&["both"]))
            .with_module("both", &fx.module_output("both"));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let res = engine.resolve("both").unwrap();
        assert_eq!(res.kind, RegistryKind::Legacy);
        assert_eq!(tool.calls.get(), 0);
    }

    #[test]
    fn test_module_registry_used_as_fallback() {
        let fx = Fixture::new();
        let tool = FakeModuleTool::new()
            .with_avail(&avail(&["modonly"]))
            .with_module("modonly", &fx.module_output("modonly"));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        assert_eq!(engine.resolve("modonly").unwrap().kind, RegistryKind::Module);
    }

    #[test]
    fn test_unknown_collection_is_config_error() {
        let fx = Fixture::new();
        let tool = FakeModuleTool::new().with_avail(&avail(&[]));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let err = engine
            .prepare(&["nope".to_string()], "echo hi", &Environment::default())
            .unwrap_err();
        assert!(matches!(err, SclError::Config(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_prepare_builds_script_in_request_order() {
        let fx = Fixture::new();
        fx.legacy("collB");
        let tool = FakeModuleTool::new()
            .with_avail(&avail(&["collA"]))
            .with_module("collA", &fx.module_output("collA"));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let plan = engine
            .prepare(
                &["collA".to_string(), "collB".to_string()],
                "echo hi",
                &Environment::default(),
            )
            .unwrap();
        let text = plan.script.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.first(), Some(&"eval \"SCLS=( ${X_SCLS[*]} )\""));
        assert_eq!(lines.last(), Some(&"echo hi"));
        let pos = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert!(pos("SCLS+=(collA)") < pos("export PATH="));
        assert!(pos("export PATH=") < pos("SCLS+=(collB)"));
        assert!(pos("SCLS+=(collB)") < pos("/collB/enable"));

        assert_eq!(plan.context.activated(), vec!["collA", "collB"]);
        assert_eq!(plan.context.enabled_after(), vec!["collA", "collB"]);
        assert_eq!(plan.context.assigned("X_SCLS"), Some("collA collB"));
        assert!(plan.context.assigned("PATH").unwrap().ends_with("/root/usr/bin:/usr/bin"));
        assert_eq!(
            plan.context.process_env(),
            vec![("MODULEPATH".to_string(), "/etc/scl/modulefiles".to_string())]
        );
    }

    #[test]
    fn test_already_enabled_collections_are_skipped() {
        let fx = Fixture::new();
        fx.legacy("collB");
        let tool = FakeModuleTool::new().with_avail(&avail(&[]));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");
        let env = Environment::from_pairs([("X_SCLS", "collB ")]);

        let plan = engine
            .prepare(&["collB".to_string(), "collB".to_string()], "true", &env)
            .unwrap();
        assert!(plan.context.activated().is_empty());
        assert_eq!(plan.context.skipped(), vec!["collB", "collB"]);
        assert!(!plan.script.render().contains("SCLS+="));
        assert_eq!(plan.context.enabled_after(), vec!["collB"]);
        assert_eq!(plan.context.assigned("X_SCLS"), None);
    }

    #[test]
    fn test_duplicate_request_activates_once() {
        let fx = Fixture::new();
        fx.legacy("collB");
        let tool = FakeModuleTool::new().with_avail(&avail(&[]));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let plan = engine
            .prepare(
                &["collB".to_string(), "collB".to_string()],
                "true",
                &Environment::default(),
            )
            .unwrap();
        assert_eq!(plan.context.activated(), vec!["collB"]);
        assert_eq!(plan.script.render().matches("SCLS+=(collB)").count(), 1);
    }

    #[test]
    fn test_failure_mid_list_aborts_planning() {
        let fx = Fixture::new();
        fx.legacy("good");
        // Registered, but the prefix does not hold the collection.
        fs::write(fx.conf.path().join("stale"), "/nonexistent/prefix\n").unwrap();
        let tool = FakeModuleTool::new().with_avail(&avail(&[]));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let err = engine
            .prepare(
                &["good".to_string(), "stale".to_string()],
                "echo hi",
                &Environment::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SclError::Config(_)));
    }

    #[test]
    fn test_empty_command_is_input_error() {
        let legacy = LegacyRegistry::new(Path::new("/nonexistent"));
        let engine = Engine::new(&[&legacy], "/etc/scl/modulefiles");
        let err = engine
            .prepare(&["x".to_string()], "  ", &Environment::default())
            .unwrap_err();
        assert!(matches!(err, SclError::Input(_)));
    }

    #[test]
    fn test_list_available_merges_registries() {
        let fx = Fixture::new();
        fx.legacy("zeta");
        fx.legacy("alpha");
        let tool = FakeModuleTool::new().with_avail(&avail(&["alpha", "mid"]));
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        assert_eq!(engine.list_available().unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_later_collection_overrides_shared_variable() {
        let fx = Fixture::new();
        let first = fx.collection_dir("first");
        let second = fx.collection_dir("second");
        fs::write(first.join("first"), "#%Module1.0\n").unwrap();
        fs::write(second.join("second"), "#%Module1.0\n").unwrap();
        let tool = FakeModuleTool::new()
            .with_avail(&avail(&["first", "second"]))
            .with_module(
                "first",
                &format!("COLPATH={} ;export COLPATH;PATH=/first/bin ;export PATH;", first.display()),
            )
            .with_module(
                "second",
                &format!("COLPATH={} ;export COLPATH;PATH=/second/bin ;export PATH;", second.display()),
            );
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let plan = engine
            .prepare(
                &["first".to_string(), "second".to_string()],
                "true",
                &Environment::default(),
            )
            .unwrap();
        let text = plan.script.render();
        let exports: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("export PATH="))
            .collect();
        assert_eq!(exports, vec!["export PATH=/first/bin", "export PATH=/second/bin"]);
        assert_eq!(plan.context.assigned("PATH"), Some("/second/bin"));
    }

    #[test]
    fn test_module_aliases_are_ignored() {
        let fx = Fixture::new();
        let dir = fx.collection_dir("collA");
        fs::write(dir.join("collA"), "#%Module1.0\n").unwrap();
        let output = format!(
            "COLPATH={} ;export COLPATH;PATH=/x ;export PATH;alias ll='ls -l';",
            dir.display()
        );
        let tool = FakeModuleTool::new()
            .with_avail(&avail(&["collA"]))
            .with_module("collA", &output);
        let legacy = LegacyRegistry::new(fx.conf.path());
        let module = ModuleRegistry::new(&tool, "/etc/scl/modulefiles");
        let engine = Engine::new(&[&legacy, &module], "/etc/scl/modulefiles");

        let plan = engine
            .prepare(&["collA".to_string()], "ll", &Environment::default())
            .unwrap();
        let text = plan.script.render();
        assert!(text.contains("export PATH=/x"));
        assert!(!text.contains("alias"));
        assert_eq!(plan.context.activated(), vec!["collA"]);
        assert_eq!(plan.context.assigned("alias ll"), None);
    }

    #[test]
    fn test_legacy_collection_without_root_is_rejected() {
        let fx = Fixture::new();
        let dir = fx.prefix.path().join("noroot");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("enable"), "export X=1\n").unwrap();
        fs::write(
            fx.conf.path().join("noroot"),
            format!("{}\n", fx.prefix.path().display()),
        )
        .unwrap();
        let legacy = LegacyRegistry::new(fx.conf.path());
        let engine = Engine::new(&[&legacy], "/etc/scl/modulefiles");

        let err = engine
            .prepare(&["noroot".to_string()], "true", &Environment::default())
            .unwrap_err();
        assert!(matches!(err, SclError::Config(_)));
    }
}
