//! Core Settings struct and implementations.

use super::DependencyStrategy;
use std::path::{Path, PathBuf};

/// The single operating system release packaging runs on.
pub const SUPPORTED_OS: &str = "windows";

/// Resolved configuration for one pipeline run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). All paths are
/// absolute once built; relative inputs are joined onto the project root.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Root of the application workspace (where `Cargo.toml` lives).
    pub(super) project_root: PathBuf,

    /// Product name used for archive and installer names.
    pub(super) product_name: String,

    /// Product version from `[package]`.
    pub(super) version: semver::Version,

    /// Native binary name without extension.
    pub(super) binary_name: String,

    /// Active dependency strategy.
    pub(super) strategy: DependencyStrategy,

    /// Pinned toolchain channel.
    pub(super) toolchain: String,

    /// UI project directory.
    pub(super) ui_dir: PathBuf,

    /// Application icon copied into the staging tree.
    pub(super) icon: PathBuf,

    /// NSIS packaging script.
    pub(super) installer_script: PathBuf,

    /// Output root, destroyed and recreated every run.
    pub(super) output_dir: PathBuf,

    /// Host OS, normally `std::env::consts::OS`.
    pub(super) host_os: String,

    /// Archive compressor program.
    pub(super) seven_zip: PathBuf,

    /// Installer generator program.
    pub(super) makensis: PathBuf,
}

impl Settings {
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    pub fn strategy(&self) -> DependencyStrategy {
        self.strategy
    }

    pub fn toolchain(&self) -> &str {
        &self.toolchain
    }

    pub fn host_os(&self) -> &str {
        &self.host_os
    }

    pub fn ui_dir(&self) -> &Path {
        &self.ui_dir
    }

    /// File whose presence means the UI bundle is already built.
    pub fn ui_marker(&self) -> PathBuf {
        self.ui_dir.join("dist").join("dist.html")
    }

    pub fn icon(&self) -> &Path {
        &self.icon
    }

    pub fn installer_script(&self) -> &Path {
        &self.installer_script
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The staging tree, `<output>/unpacked`.
    pub fn staging_dir(&self) -> PathBuf {
        self.output_dir.join("unpacked")
    }

    /// Scratch area for downloaded dependencies.
    pub fn deps_dir(&self) -> PathBuf {
        self.project_root.join("deps")
    }

    /// Cargo's release output directory.
    pub fn release_dir(&self) -> PathBuf {
        self.project_root.join("target").join("release")
    }

    /// Build-script output directories (`target/release/build`).
    pub fn build_output_dir(&self) -> PathBuf {
        self.release_dir().join("build")
    }

    /// Compiled Windows executable.
    pub fn binary_path(&self) -> PathBuf {
        self.release_dir().join(format!("{}.exe", self.binary_name))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-windows.7z", self.product_name))
    }

    pub fn installer_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-setup.exe", self.product_name))
    }

    pub fn seven_zip(&self) -> &Path {
        &self.seven_zip
    }

    pub fn makensis(&self) -> &Path {
        &self.makensis
    }
}
