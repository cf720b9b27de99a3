// src/core/config.rs

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_ENV, CONFIG_FILENAME, DEFAULT_SHELL, DEFAULT_TMP_DIR, MODULE_CMD, RPM_CMD,
    SCL_CONF_DIR, SCL_MODULES_PATH, SYSTEM_CONFIG_FILE,
};
use crate::error::{Result, SclError};

/// Installation-specific locations. Every field has a built-in default, so an
/// empty or absent configuration file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SclConfig {
    /// Directory with one pointer file per legacy collection.
    pub conf_dir: PathBuf,
    /// Directory holding collection module files.
    pub modules_path: PathBuf,
    /// Environment-module tool.
    pub module_cmd: PathBuf,
    /// Interpreter for the activation script.
    pub shell: PathBuf,
    /// Where activation scripts are written.
    pub tmp_dir: PathBuf,
    /// Package database query tool.
    pub rpm_cmd: PathBuf,
}

impl Default for SclConfig {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from(SCL_CONF_DIR),
            modules_path: PathBuf::from(SCL_MODULES_PATH),
            module_cmd: PathBuf::from(MODULE_CMD),
            shell: PathBuf::from(DEFAULT_SHELL),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            rpm_cmd: PathBuf::from(RPM_CMD),
        }
    }
}

impl SclConfig {
    /// Loads the configuration the binary runs with.
    ///
    /// `SCL_CONFIG` names an explicit file that must exist. Without it the
    /// per-user file is tried, then the system one, then the defaults.
    pub fn load() -> Result<Self> {
        if let Some(explicit) = env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(explicit);
            if !path.is_file() {
                return Err(SclError::Config(format!(
                    "Configuration file '{}' named by {} does not exist.",
                    path.display(),
                    CONFIG_ENV
                )));
            }
            return Self::from_file(&path);
        }

        let user_file = dirs::config_dir().map(|dir| dir.join("scl").join(CONFIG_FILENAME));
        let candidates = user_file
            .into_iter()
            .chain(std::iter::once(PathBuf::from(SYSTEM_CONFIG_FILE)));
        for candidate in candidates {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        log::debug!("No configuration file found; using built-in defaults.");
        Ok(Self::default())
    }

    /// Reads and parses one TOML file, then expands `~` and `$VAR` in its paths.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SclError::disk("Unable to read configuration file", path, e))?;
        let config = Self::from_toml(&content).map_err(|e| {
            SclError::Config(format!("Invalid configuration file '{}': {}", path.display(), e))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: Self =
            toml::from_str(content).map_err(|e| SclError::Config(e.message().to_string()))?;
        raw.expanded()
    }

    fn expanded(self) -> Result<Self> {
        Ok(Self {
            conf_dir: expand_path(&self.conf_dir)?,
            modules_path: expand_path(&self.modules_path)?,
            module_cmd: expand_path(&self.module_cmd)?,
            shell: expand_path(&self.shell)?,
            tmp_dir: expand_path(&self.tmp_dir)?,
            rpm_cmd: expand_path(&self.rpm_cmd)?,
        })
    }

    /// `modules_path` as text without trailing slashes, the form module-file
    /// paths and avail headers are compared against.
    pub fn modules_path_str(&self) -> String {
        crate::core::strings::strip_trailing_slashes(&self.modules_path.to_string_lossy()).to_string()
    }
}

/// Expands home directory and environment variables in a configured path.
fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).map_err(|e| {
        SclError::Config(format!("Failed to expand configured path '{}': {}", raw, e))
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
