// src/cli/handlers/mod.rs

// One module per command-line action.

/// State and helpers shared by every handler.
pub mod commons;
/// `deregister`
pub mod deregister;
/// `list-collections`
pub mod list_collections;
/// `list-enabled`
pub mod list_enabled;
/// `list-packages`
pub mod list_packages;
/// `load` and `unload`
pub mod load;
/// `man`
pub mod man;
/// `register`
pub mod register;
/// `enable` and `run`
pub mod run;
