//! Windows release packager for a Rust desktop application with a web UI
//! and an embedded Chromium runtime.
//!
//! The library drives the whole release sequence:
//! - UI bundle build (npm)
//! - Audio codec dependency provisioning (none, bundled DLLs, or static vcpkg build)
//! - Toolchain pin and release build
//! - Staging of the binary, icon and browser runtime
//! - 7-Zip archive and NSIS installer, plus a checksum manifest
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod metadata;
pub mod packager;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, Result};
