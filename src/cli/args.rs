//! Command line argument parsing.

use crate::packager::DependencyStrategy;
use clap::Parser;
use std::path::PathBuf;

/// Windows release packager for the desktop application
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "release_packager",
    version,
    about = "Builds and packages the Windows release of the desktop application",
    long_about = "Builds the web UI and the native binary, stages the embedded browser runtime next to them,
and produces a 7-Zip archive and an NSIS installer.

Usage:
  release_packager
  release_packager --strategy dynamic-bundle
  release_packager --project-root C:/src/onetagger --strategy static-link

Exit code 0 = archive and installer exist in the output directory."
)]
pub struct Args {
    /// Application workspace root (the directory holding Cargo.toml)
    #[arg(short = 'p', long, value_name = "PATH", env = "RELEASE_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// How the audio codec dependency is provided to the native build
    ///
    /// Overrides `strategy` in [package.metadata.release]. Default: none.
    #[arg(short = 's', long, value_enum, env = "RELEASE_DEP_STRATEGY")]
    pub strategy: Option<DependencyStrategy>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
