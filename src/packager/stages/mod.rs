//! Pipeline stages, in execution order.
//!
//! - [`precondition`] - host OS check and UI bundle build
//! - [`provision`] - audio codec dependency strategy and environment overlay
//! - [`toolchain`] - rustup channel pin
//! - [`compile`] - `cargo build --release`
//! - [`byproduct`] - CEF payload discovery and relocation into the staging tree
//! - [`stager`] - binary, icon and runtime library copies
//! - [`archiver`] - 7-Zip release archive
//! - [`installer`] - NSIS installer image

pub mod archiver;
pub mod byproduct;
pub mod compile;
pub mod installer;
pub mod precondition;
pub mod provision;
pub mod stager;
pub mod toolchain;

/// Identifies the stage an error or log line belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    Precondition,
    Provision,
    Toolchain,
    Compile,
    Archive,
    Installer,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Precondition => "precondition check",
            Self::Provision => "dependency provisioning",
            Self::Toolchain => "toolchain pin",
            Self::Compile => "native build",
            Self::Archive => "archive",
            Self::Installer => "installer",
        })
    }
}
