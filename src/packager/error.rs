//! Error types for the packaging pipeline.
//!
//! Every failure aborts the run. The variants mirror the pipeline's failure
//! surface: wrong host, missing configuration, failed subprocess, missing
//! build byproduct, missing artifact, plus the I/O and network plumbing
//! underneath them.

use std::path::{Path, PathBuf};

use super::stages::Stage;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host operating system is not the packaging target.
    #[error("unsupported platform `{host}`: release packaging only runs on {required}")]
    PlatformUnsupported {
        /// Host OS as reported by `std::env::consts::OS`
        host: String,
        /// The one supported OS
        required: &'static str,
    },

    /// A required environment variable is unset or invalid.
    #[error("environment variable {variable} {reason}")]
    MissingEnvironment {
        /// Variable name
        variable: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// An external tool exited with a non-zero status.
    #[error("{stage}: `{command}` failed with exit code {}", code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    ToolInvocation {
        /// Stage that ran the tool
        stage: Stage,
        /// Program and arguments
        command: String,
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
    },

    /// An external tool could not be started at all.
    #[error("failed to run `{command}`: {error}")]
    ToolSpawn {
        /// Program that failed to start
        command: String,
        /// Underlying spawn error
        #[source]
        error: std::io::Error,
    },

    /// No build byproduct matched the naming convention.
    #[error("no `{prefix}*` directory with an `{marker}` subdirectory found in {}", search_dir.display())]
    MissingByproduct {
        /// Directory that was scanned
        search_dir: PathBuf,
        /// Required name prefix
        prefix: &'static str,
        /// Required marker subdirectory
        marker: &'static str,
    },

    /// A file expected for staging does not exist.
    #[error("missing {what}: {}", path.display())]
    MissingArtifact {
        /// Human readable kind (binary, icon, library, ...)
        what: &'static str,
        /// Expected location
        path: PathBuf,
    },

    /// Network download failed.
    #[error("download of {url} failed: {reason}")]
    Download {
        /// Requested URL
        url: String,
        /// Failure description
        reason: String,
    },

    /// Archive extraction failed.
    #[error("failed to extract {}: {reason}", archive.display())]
    Extract {
        /// Archive being extracted
        archive: PathBuf,
        /// Failure description
        reason: String,
    },

    /// I/O error with the operation and path that caused it.
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: std::io::Error,
    },

    /// Directory walk error.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix error.
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Extension for attaching filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps an I/O error with the operation being performed and its path.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Extension for turning `Option`s and foreign errors into [`Error`].
pub trait Context<T> {
    /// Attaches a message, producing [`Error::GenericError`].
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T> Context<T> for Result<T> {
    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($($arg)*)))
    };
}
