// src/core/script.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::constants::ENABLED_MARKER;
use crate::core::env_diff::EnvVar;
use crate::error::{Result, SclError};

lazy_static! {
    // Names bash accepts on the left of an `export NAME=...`.
    static ref SHELL_VAR_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex");
}

/// Text of the transient bash script that activates collections and then runs
/// the caller's command. Built statement by statement; rendering is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationScript {
    lines: Vec<String>,
    command: Option<String>,
}

impl Default for ActivationScript {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `name` can be exported by the activation script.
pub fn is_exportable(name: &str) -> bool {
    SHELL_VAR_NAME.is_match(name)
}

fn quote(text: &str) -> Result<String> {
    shlex::try_quote(text)
        .map(|q| q.into_owned())
        .map_err(|e| SclError::Input(format!("Cannot quote {:?} for the shell: {}", text, e)))
}

impl ActivationScript {
    /// Starts a script whose first statement rebuilds the tracking array from
    /// the legacy marker.
    pub fn new() -> Self {
        Self {
            lines: vec![format!("eval \"SCLS=( ${{{}[*]}} )\"", ENABLED_MARKER)],
            command: None,
        }
    }

    /// Records `name` as enabled for everything the script runs afterwards.
    pub fn track(&mut self, name: &str) -> Result<()> {
        self.lines.push(format!("SCLS+=({})", quote(name)?));
        self.lines.push(format!(
            "export {}=$(printf '%q ' \"${{SCLS[@]}}\")",
            ENABLED_MARKER
        ));
        Ok(())
    }

    /// Exports one assignment from a module delta.
    pub fn export(&mut self, var: &EnvVar) -> Result<()> {
        if !is_exportable(&var.name) {
            return Err(SclError::Config(format!(
                "Module output assigns to '{}', which is not a valid variable name.",
                var.name
            )));
        }
        self.lines
            .push(format!("export {}={}", var.name, quote(&var.value)?));
        Ok(())
    }

    /// Sources a legacy collection's scriptlet.
    pub fn source(&mut self, scriptlet: &Path) -> Result<()> {
        self.lines
            .push(format!(". {}", quote(&scriptlet.to_string_lossy())?));
        Ok(())
    }

    /// Sets the caller's command, appended verbatim after every activation step.
    pub fn set_command(&mut self, command: &str) {
        self.command = Some(command.to_string());
    }

    /// Script text.
    pub fn render(&self) -> String {
        let mut script = String::new();
        for line in &self.lines {
            script.push_str(line);
            script.push('\n');
        }
        if let Some(command) = &self.command {
            script.push_str(command);
            script.push('\n');
        }
        script
    }

    /// Script text that deletes its own file before doing anything else. Used
    /// when the script replaces the current process and nobody is left to
    /// clean up after it.
    pub fn render_self_removing(&self, script_path: &Path) -> Result<String> {
        Ok(format!(
            "rm -f -- {}\n{}",
            quote(&script_path.to_string_lossy())?,
            self.render()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_script_has_preamble_and_command() {
        let mut script = ActivationScript::new();
        script.set_command("echo hi");
        assert_eq!(script.render(), "eval \"SCLS=( ${X_SCLS[*]} )\"\necho hi\n");
    }

    #[test]
    fn test_track_and_export_lines() {
        let mut script = ActivationScript::new();
        script.track("collA").unwrap();
        script.export(&EnvVar::new("FOO", "bar baz")).unwrap();
        script.source(Path::new("/opt/rh/collB/enable")).unwrap();
        script.set_command("make -j4");

        let text = script.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "SCLS+=(collA)");
        assert_eq!(lines[2], "export X_SCLS=$(printf '%q ' \"${SCLS[@]}\")");
        assert_eq!(lines[3], "export FOO='bar baz'");
        assert_eq!(lines[4], ". /opt/rh/collB/enable");
        assert_eq!(lines.last(), Some(&"make -j4"));
    }

    #[test]
    fn test_export_values_are_not_expanded() {
        let mut script = ActivationScript::new();
        script.export(&EnvVar::new("PS1", "$(whoami) `id`")).unwrap();
        let text = script.render();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(shlex::split(line.trim_start_matches("export PS1=")).unwrap(), vec!["$(whoami) `id`"]);
    }

    #[test]
    fn test_is_exportable() {
        assert!(is_exportable("LD_LIBRARY_PATH"));
        assert!(is_exportable("_x1"));
        assert!(!is_exportable("alias ll"));
        assert!(!is_exportable("1ST"));
    }

    #[test]
    fn test_export_rejects_bad_names() {
        let mut script = ActivationScript::new();
        let err = script.export(&EnvVar::new("BAD NAME", "x")).unwrap_err();
        assert!(matches!(err, SclError::Config(_)));
    }

    #[test]
    fn test_self_removing_script_starts_with_rm() {
        let mut script = ActivationScript::new();
        script.set_command("true");
        let text = script.render_self_removing(Path::new("/var/tmp/sclAbC123")).unwrap();
        assert!(text.starts_with("rm -f -- /var/tmp/sclAbC123\n"));
        assert!(text.ends_with("true\n"));
    }
}
