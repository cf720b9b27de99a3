// src/core/mod.rs

/// Installation configuration.
pub mod config;
/// Collections already active in the caller's environment.
pub mod enabled;
/// Resolution and activation planning.
pub mod engine;
/// Parsing of module-tool output.
pub mod env_diff;
/// Snapshot of the caller's environment.
pub mod environment;
/// Package database queries.
pub mod packages;
/// Registering and deregistering collections.
pub mod registration;
/// The legacy and module registries.
pub mod registry;
/// The activation script text.
pub mod script;
/// Small string helpers.
pub mod strings;
