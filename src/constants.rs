// src/constants.rs

/// Directory holding one pointer file per legacy collection.
pub const SCL_CONF_DIR: &str = "/etc/scl/conf";

/// Directory the module tool searches for collection module files.
pub const SCL_MODULES_PATH: &str = "/etc/scl/modulefiles";

/// The environment-module tool.
pub const MODULE_CMD: &str = "/usr/bin/modulecmd";

/// Interpreter for the activation script. The tracking preamble needs bash arrays.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Where activation scripts are created.
pub const DEFAULT_TMP_DIR: &str = "/var/tmp";

/// Package database query tool.
pub const RPM_CMD: &str = "rpm";

/// System-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/scl/scl.toml";

/// Name of the per-user configuration file (inside `<config dir>/scl/`).
pub const CONFIG_FILENAME: &str = "scl.toml";

/// Points at an explicit configuration file, bypassing the search.
pub const CONFIG_ENV: &str = "SCL_CONFIG";

/// Space-delimited list of collections enabled the legacy way.
pub const ENABLED_MARKER: &str = "X_SCLS";

/// Colon-delimited list of module files loaded by the module tool.
pub const LOADED_MODULE_FILES: &str = "_LMFILES_";

/// Search path of the module tool.
pub const MODULEPATH: &str = "MODULEPATH";

/// Variable a module-based collection uses to announce its root directory.
pub const COLPATH_VAR: &str = "COLPATH";

/// Scriptlet sourced to activate a legacy collection.
pub const ENABLE_SCRIPTLET: &str = "enable";

/// Scriptlet run after a module-based collection is registered.
pub const REGISTER_SCRIPTLET: &str = "register";

/// Scriptlet run before a module-based collection is deregistered.
pub const DEREGISTER_SCRIPTLET: &str = "deregister";

/// Directory a valid collection keeps its file tree in.
pub const ROOT_DIR: &str = "root";

/// Prefix of the temporary activation script.
pub const SCRIPT_PREFIX: &str = "scl";
