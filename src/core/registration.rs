// src/core/registration.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEREGISTER_SCRIPTLET, REGISTER_SCRIPTLET};
use crate::core::engine::{self, Engine};
use crate::core::packages::PackageDb;
use crate::core::registry::{self, LegacyRegistry, RegistryKind};
use crate::core::strings;
use crate::error::{Result, SclError};
use crate::system::executor::{self, ExecutionError};

/// Adds collections to, and removes them from, the registries.
#[derive(Debug)]
pub struct Registrar<'a> {
    legacy: &'a LegacyRegistry,
    modules_path: PathBuf,
    packages: &'a PackageDb,
}

/// Runs `<dir>/<name>` if it exists. A scriptlet that fails is a run error.
fn run_scriptlet(dir: &Path, name: &str) -> Result<()> {
    let program = dir.join(name);
    if !program.exists() {
        return Ok(());
    }
    let code = executor::run_status(&program, &[], &[], false)?;
    if code != 0 {
        return Err(ExecutionError::NonZeroExitStatus {
            command: program.display().to_string(),
            code,
        }
        .into());
    }
    Ok(())
}

#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_link(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::other("symbolic links are only supported on Unix"))
}

impl<'a> Registrar<'a> {
    /// Works on `legacy` and on module links under `modules_path`.
    pub fn new(legacy: &'a LegacyRegistry, modules_path: &Path, packages: &'a PackageDb) -> Self {
        Self {
            legacy,
            modules_path: modules_path.to_path_buf(),
            packages,
        }
    }

    fn module_link(&self, name: &str) -> PathBuf {
        self.modules_path.join(name)
    }

    /// Registers the collection installed at the absolute path `colpath`.
    ///
    /// A collection shipping a module file `<colpath>/<name>` is linked into
    /// the module search path and its `register` scriptlet is run; otherwise a
    /// legacy pointer file is written.
    pub fn register(&self, colpath: &str) -> Result<(String, RegistryKind)> {
        if !colpath.starts_with('/') {
            return Err(SclError::Input(format!(
                "Collection must be given as an absolute path, not '{}'.",
                colpath
            )));
        }
        let path = PathBuf::from(strings::strip_trailing_slashes(colpath));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SclError::Input(format!("'{}' does not name a collection.", colpath)))?;
        engine::validate_name(&name)?;

        if !path.is_dir() || !registry::is_valid_collection_dir(&path, &name) {
            return Err(SclError::Input(format!(
                "'{}' is not a valid collection.",
                path.display()
            )));
        }
        let link = self.module_link(&name);
        if self.legacy.pointer_file(&name).exists() || link.symlink_metadata().is_ok() {
            return Err(SclError::Input(format!(
                "Collection '{}' is already registered.",
                name
            )));
        }

        let module_file = path.join(&name);
        if !module_file.is_file() {
            self.legacy.register(&name, &path)?;
            return Ok((name, RegistryKind::Legacy));
        }

        create_link(&module_file, &link)
            .map_err(|e| SclError::disk("Unable to create module link", &link, e))?;
        log::debug!("Linked {} -> {}", link.display(), module_file.display());
        if let Err(e) = run_scriptlet(&path, REGISTER_SCRIPTLET) {
            if let Err(rm) = fs::remove_file(&link) {
                log::warn!(
                    "Unable to remove {}: {}. Remove it by hand before registering again.",
                    link.display(),
                    rm
                );
            }
            return Err(e);
        }
        Ok((name, RegistryKind::Module))
    }

    /// Removes `name` from whichever registry provides it.
    ///
    /// Entries installed by a package are kept unless `force` is set.
    pub fn deregister(&self, engine: &Engine<'_>, name: &str, force: bool) -> Result<RegistryKind> {
        let resolution = engine.resolve(name)?;
        let entry = match resolution.kind {
            RegistryKind::Legacy => self.legacy.pointer_file(name),
            RegistryKind::Module => self.module_link(name),
        };

        if !force && self.packages.owns_file(&entry)? {
            return Err(SclError::Input(format!(
                "Collection '{}' was installed as a package; use --force to deregister it.",
                name
            )));
        }

        match resolution.kind {
            RegistryKind::Legacy => self.legacy.deregister(name)?,
            RegistryKind::Module => {
                run_scriptlet(&resolution.path, DEREGISTER_SCRIPTLET)?;
                fs::remove_file(&entry).map_err(|e| {
                    SclError::System(format!("Unable to remove '{}': {}", entry.display(), e))
                })?;
            }
        }
        Ok(resolution.kind)
    }
}
