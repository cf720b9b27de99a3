// src/core/registry/legacy.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Activation, Registry, RegistryKind, Resolution};
use crate::constants::{ENABLE_SCRIPTLET, ENABLED_MARKER};
use crate::core::environment::Environment;
use crate::core::strings;
use crate::error::{Result, SclError};

/// Pointer-file registry: `<conf_dir>/<name>` holds the prefix directory the
/// collection is installed under.
#[derive(Debug, Clone)]
pub struct LegacyRegistry {
    conf_dir: PathBuf,
}

impl LegacyRegistry {
    /// Registry backed by the pointer files in `conf_dir`.
    pub fn new(conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            conf_dir: conf_dir.into(),
        }
    }

    /// Path of the pointer file for `name`.
    pub fn pointer_file(&self, name: &str) -> PathBuf {
        self.conf_dir.join(name)
    }

    /// Reads the prefix out of a pointer file. `Ok(None)` when the file is absent.
    fn read_prefix(&self, name: &str) -> Result<Option<String>> {
        let pointer = self.pointer_file(name);
        let content = match fs::read_to_string(&pointer) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SclError::disk("Unable to read registry file", pointer, e)),
        };

        // Only the first line counts; trailing whitespace and slashes are noise.
        let first_line = content.lines().next().unwrap_or_default();
        let prefix = first_line.trim_end_matches(|c: char| c.is_whitespace() || c == '/');
        if prefix.trim().is_empty() {
            return Err(SclError::Config(format!(
                "Registry file '{}' does not name a directory.",
                pointer.display()
            )));
        }
        Ok(Some(prefix.to_string()))
    }

    /// Writes a pointer file registering the collection at `colpath`.
    pub fn register(&self, name: &str, colpath: &Path) -> Result<()> {
        let pointer = self.pointer_file(name);
        if pointer.exists() {
            return Err(SclError::Input(format!(
                "Collection '{}' is already registered.",
                name
            )));
        }
        let prefix = colpath.parent().ok_or_else(|| {
            SclError::Input(format!("'{}' has no parent directory.", colpath.display()))
        })?;
        fs::write(&pointer, format!("{}\n", prefix.display()))
            .map_err(|e| SclError::disk("Unable to write registry file", &pointer, e))?;
        log::debug!("Wrote pointer file {}", pointer.display());
        Ok(())
    }

    /// Removes the pointer file of `name`.
    pub fn deregister(&self, name: &str) -> Result<()> {
        let pointer = self.pointer_file(name);
        fs::remove_file(&pointer)
            .map_err(|e| SclError::disk("Unable to remove registry file", &pointer, e))
    }
}

/// Names in the legacy marker: space-delimited, possibly `printf %q` escaped.
pub fn enabled_from_marker(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            strings::split_words(v, ' ')
                .into_iter()
                .map(strings::unescape)
                .collect()
        })
        .unwrap_or_default()
}

impl Registry for LegacyRegistry {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Legacy
    }

    fn resolve_path(&self, name: &str) -> Result<Option<Resolution>> {
        let Some(prefix) = self.read_prefix(name)? else {
            return Ok(None);
        };
        let path = Path::new(&prefix).join(name);
        let scriptlet = path.join(ENABLE_SCRIPTLET);
        log::debug!("Legacy registry: '{}' -> {}", name, path.display());
        Ok(Some(Resolution::new(
            name,
            path,
            RegistryKind::Legacy,
            Activation::Source(scriptlet),
        )))
    }

    fn list_available(&self) -> Result<Vec<String>> {
        if !self.conf_dir.is_dir() {
            log::debug!("Legacy registry directory {} is missing.", self.conf_dir.display());
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.conf_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.conf_dir).to_path_buf();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                SclError::disk("Unable to list registry directory", path, io)
            })?;
            let name = entry.file_name().to_string_lossy();
            if !name.starts_with('.') {
                names.push(name.into_owned());
            }
        }
        Ok(names)
    }

    fn enabled(&self, env: &Environment) -> Vec<String> {
        enabled_from_marker(env.get(ENABLED_MARKER))
    }
}
