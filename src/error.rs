// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::system::executor::ExecutionError;

/// Every failure the activation engine can surface.
///
/// The variants follow the taxonomy the command-line tool reports through its
/// exit code; see [`SclError::exit_code`].
#[derive(Error, Debug)]
pub enum SclError {
    /// A collection is not defined in either registry, or its entry is malformed.
    #[error("{0}")]
    Config(String),
    /// A registry file or the activation script could not be read or written.
    #[error("{message} '{}': {source}", .path.display())]
    Disk {
        /// What was being attempted.
        message: String,
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The caller asked for something that cannot be satisfied as stated.
    #[error("{0}")]
    Input(String),
    /// A required external process failed to start or terminated abnormally.
    #[error(transparent)]
    Run(#[from] ExecutionError),
    /// An environment primitive failed unexpectedly.
    #[error("{0}")]
    System(String),
    /// The final command was stopped with Ctrl+C.
    #[error("Command was interrupted.")]
    Interrupted,
}

/// Library-wide result alias.
pub type Result<T, E = SclError> = std::result::Result<T, E>;

impl SclError {
    /// Builds a [`SclError::Disk`] for `path`.
    pub fn disk(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Disk {
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// Process exit code reported when activation fails before the command runs.
    ///
    /// Numbers match the historical `scl` return codes, so wrappers that
    /// inspect them keep working. An interrupted command exits like a shell
    /// would after SIGINT.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 2,
            Self::Disk { .. } => 3,
            Self::Config(_) => 4,
            Self::Run(_) => 5,
            Self::System(_) => 7,
            Self::Interrupted => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let io = || std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let codes = [
            SclError::Input("x".into()).exit_code(),
            SclError::disk("read", "/nope", io()).exit_code(),
            SclError::Config("x".into()).exit_code(),
            SclError::Run(ExecutionError::EmptyOutput("modulecmd".into())).exit_code(),
            SclError::System("x".into()).exit_code(),
            SclError::Interrupted.exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5, 7, 130]);
    }

    #[test]
    fn test_disk_error_mentions_path() {
        let err = SclError::disk(
            "Unable to read",
            "/etc/scl/conf/foo",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/etc/scl/conf/foo"));
        assert!(msg.contains("denied"));
    }
}
