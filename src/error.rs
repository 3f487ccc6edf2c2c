//! Top-level error types for the release packager.
//!
//! Pipeline failures live in [`crate::packager::Error`]; this module wraps
//! them together with CLI and manifest loading failures.

use thiserror::Error;

/// Result type alias for release packager operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for the release packager binary
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors, reported verbatim
    #[error(transparent)]
    Pipeline(#[from] crate::packager::Error),
}

/// CLI and project configuration errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments or project configuration
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}
