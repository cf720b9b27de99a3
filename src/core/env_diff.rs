//! # Environment Diff Extractor
//!
//! The module tool answers `sh add <name>` with a shell fragment such as
//! `PATH=/x ;export PATH ;FOO=bar\ baz ;export FOO ;`. This module turns that
//! text, and the `-t avail` listing, into structured values. Nothing here
//! spawns processes: the text comes in through [`ModuleTool`].
//!
//! [`ModuleTool`]: crate::system::module_tool::ModuleTool

use std::collections::HashMap;

use crate::core::strings;
use crate::error::{Result, SclError};
use crate::system::module_tool::{ModuleTool, OutputStream};

/// A single `NAME=VALUE` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

impl EnvVar {
    /// Creates an assignment.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered assignments a collection applies. Later entries win for the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVarDelta {
    vars: Vec<EnvVar>,
}

impl EnvVarDelta {
    /// Wraps already-parsed assignments, keeping their order.
    pub fn new(vars: Vec<EnvVar>) -> Self {
        Self { vars }
    }

    /// Assignments in source order.
    pub fn vars(&self) -> &[EnvVar] {
        &self.vars
    }

    /// Effective value of `name`, i.e. its last assignment.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|var| var.name == name)
            .map(|var| var.value.as_str())
    }
}

/// Parses the output of `<module-cmd> sh add <name>`.
///
/// The fragment is split on `;`. Pieces without `=` are the `export NAME`
/// halves and are dropped. Kept pieces lose a leading newline (newer tool
/// versions emit one per entry) and trailing spaces, then have their backslash
/// escapes removed. The name is everything before the first `=`, minus any
/// earlier line (an `export NAME` half without its own `;`).
pub fn parse_env_output(output: &str) -> EnvVarDelta {
    let vars = strings::split_words(output, ';')
        .into_iter()
        .filter(|part| part.contains('='))
        .filter_map(|part| {
            let part = part.trim_start_matches(['\n', '\r']);
            let part = strings::strip_trailing(part, ' ');
            let (name, raw_value) = part.split_once('=')?;
            let name = name.rsplit('\n').next().unwrap_or_default().trim();
            if name.is_empty() {
                log::debug!("Ignoring assignment without a name: {:?}", part);
                return None;
            }
            Some(EnvVar::new(name, strings::unescape(raw_value)))
        })
        .collect();
    EnvVarDelta::new(vars)
}

/// Parses the `-t avail` listing into `search path -> module names`.
///
/// The listing is a sequence of blocks, each a `<search-path>:` header
/// followed by one module name per line. Paths are stored without trailing
/// slashes.
pub fn parse_avail_listing(output: &str) -> HashMap<String, Vec<String>> {
    let mut listing: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(header) = line.strip_suffix(':') {
            let path = strings::strip_trailing_slashes(header).to_string();
            listing.entry(path.clone()).or_default();
            current = Some(path);
        } else if line.contains(':') {
            // Some tool versions print notes such as "ModuleCmd_Avail.c(217):ERROR...".
            log::debug!("Skipping unexpected avail line: {}", line);
            current = None;
        } else if let Some(path) = &current {
            listing.entry(path.clone()).or_default().push(line.to_string());
        }
    }
    listing
}

/// Asks the module tool for the assignments that activate `name`.
///
/// Fails with [`SclError::Run`] when the tool cannot be run, exits non-zero,
/// or prints nothing at all.
pub fn get_env_vars(tool: &dyn ModuleTool, name: &str) -> Result<EnvVarDelta> {
    let output = tool.query(&["sh", "add", name], OutputStream::Stdout)?;
    if output.trim().is_empty() {
        return Err(SclError::Run(
            crate::system::executor::ExecutionError::EmptyOutput(format!("sh add {}", name)),
        ));
    }
    let delta = parse_env_output(&output);
    log::debug!("Collection '{}' sets {} variable(s).", name, delta.vars().len());
    Ok(delta)
}

/// Module names available under `modules_path`, in listing order.
pub fn get_available_modules(tool: &dyn ModuleTool, modules_path: &str) -> Result<Vec<String>> {
    let output = tool.query(&["sh", "-t", "avail"], OutputStream::Stderr)?;
    let mut listing = parse_avail_listing(&output);
    Ok(listing
        .remove(strings::strip_trailing_slashes(modules_path))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::module_tool::testing::FakeModuleTool;

    #[test]
    fn test_parse_env_output_drops_export_halves_and_unescapes() {
        let delta = parse_env_output("PATH=/x ;export PATH\nFOO=bar\\ baz ;export FOO\n");
        assert_eq!(
            delta.vars(),
            &[EnvVar::new("PATH", "/x"), EnvVar::new("FOO", "bar baz")]
        );
    }

    #[test]
    fn test_parse_env_output_handles_leading_newlines() {
        let output = "\nCOLPATH=/opt/rh/coll ;export COLPATH;\nLD_LIBRARY_PATH=/opt/rh/coll/root/lib64 ;export LD_LIBRARY_PATH;\n";
        let delta = parse_env_output(output);
        assert_eq!(delta.vars().len(), 2);
        assert_eq!(delta.get("COLPATH"), Some("/opt/rh/coll"));
        assert_eq!(
            delta.get("LD_LIBRARY_PATH"),
            Some("/opt/rh/coll/root/lib64")
        );
    }

    #[test]
    fn test_parse_env_output_keeps_order_and_last_write_wins() {
        let delta = parse_env_output("A=1 ;export A;B=2 ;export B;A=3 ;export A;");
        let names: Vec<_> = delta.vars().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "A"]);
        assert_eq!(delta.get("A"), Some("3"));
    }

    #[test]
    fn test_parse_env_output_value_may_contain_equals() {
        let delta = parse_env_output("OPTS=-Dkey=value ;export OPTS;");
        assert_eq!(delta.get("OPTS"), Some("-Dkey=value"));
    }

    #[test]
    fn test_parse_env_output_empty_input() {
        assert!(parse_env_output("").vars().is_empty());
        assert!(parse_env_output("export A; export B;").vars().is_empty());
    }

    #[test]
    fn test_parse_avail_listing_collections_at_the_end() {
        let output = "/usr/share/Modules/modulefiles:\nmodulename1\nmodulename2\n/etc/scl/modulefiles:\nscl1\nscl2\nscl3\n";
        let listing = parse_avail_listing(output);
        assert_eq!(listing["/etc/scl/modulefiles"], vec!["scl1", "scl2", "scl3"]);
        assert_eq!(listing["/usr/share/Modules/modulefiles"].len(), 2);
    }

    #[test]
    fn test_parse_avail_listing_collections_in_the_middle() {
        let output = "/usr/share/Modules/modulefiles:\nm1\n/etc/scl/modulefiles/:\nsclA\nsclB\n/etc/modulefiles:\nm4\n";
        let listing = parse_avail_listing(output);
        assert_eq!(listing["/etc/scl/modulefiles"], vec!["sclA", "sclB"]);
        assert_eq!(listing["/etc/modulefiles"], vec!["m4"]);
    }

    #[test]
    fn test_parse_avail_listing_empty_block() {
        let listing = parse_avail_listing("/usr/share/Modules/modulefiles:\nm1\n/etc/scl/modulefiles:\n");
        assert!(listing["/etc/scl/modulefiles"].is_empty());
    }

    #[test]
    fn test_get_available_modules_filters_by_search_path() {
        let tool = FakeModuleTool::new()
            .with_avail("/usr/share/Modules/modulefiles:\ndotmodules\n/etc/scl/modulefiles:\ncollA\ncollB\n");
        let names = get_available_modules(&tool, "/etc/scl/modulefiles/").unwrap();
        assert_eq!(names, vec!["collA", "collB"]);
    }

    #[test]
    fn test_get_available_modules_without_block_is_empty() {
        let tool = FakeModuleTool::new().with_avail("/usr/share/Modules/modulefiles:\nm1\n");
        assert!(get_available_modules(&tool, "/etc/scl/modulefiles").unwrap().is_empty());
    }

    #[test]
    fn test_get_env_vars_empty_output_is_run_error() {
        let tool = FakeModuleTool::new().with_module("quiet", "");
        let err = get_env_vars(&tool, "quiet").unwrap_err();
        assert!(matches!(err, SclError::Run(_)));
    }

    #[test]
    fn test_get_env_vars_tool_failure_is_run_error() {
        let tool = FakeModuleTool::new();
        let err = get_env_vars(&tool, "missing").unwrap_err();
        assert!(matches!(err, SclError::Run(_)));
    }
}
