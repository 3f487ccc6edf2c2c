//! Project metadata from the application's Cargo.toml

use crate::error::{CliError, ReleaseError, Result};
use crate::packager::DependencyStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Package metadata extracted from Cargo.toml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Package name from Cargo.toml
    pub name: String,

    /// Package version from Cargo.toml (e.g., "1.7.0")
    pub version: String,
}

/// Packaging configuration from the `[package.metadata.release]` table.
///
/// Every key is optional; unset keys fall back to the settings defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Display name used for the archive and installer file names
    pub product_name: Option<String>,
    /// Audio codec dependency strategy
    pub strategy: Option<DependencyStrategy>,
    /// Application icon, relative to the project root
    pub icon: Option<PathBuf>,
    /// NSIS script, relative to the project root
    pub installer_script: Option<PathBuf>,
    /// Web UI project directory
    pub ui_dir: Option<PathBuf>,
    /// Toolchain channel pinned before building
    pub toolchain: Option<String>,
    /// Output root for the staging tree and release artifacts
    pub output_dir: Option<PathBuf>,
}

/// Complete manifest data from Cargo.toml
#[derive(Debug, Clone)]
pub struct CargoManifest {
    /// Package metadata ([package] section)
    pub metadata: PackageMetadata,

    /// Primary binary name (from [[bin]] or package.name)
    pub binary_name: String,

    /// Release settings (from [package.metadata.release])
    pub release: ReleaseConfig,
}

/// Load the manifest from Cargo.toml (single read + parse)
pub fn load_manifest(cargo_toml_path: &Path) -> Result<CargoManifest> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        ReleaseError::Cli(CliError::ExecutionFailed {
            command: "read_cargo_toml".to_string(),
            reason: format!("Failed to read {}: {}", cargo_toml_path.display(), e),
        })
    })?;
    parse_manifest(&manifest)
}

/// Parse manifest text already read from disk
pub fn parse_manifest(manifest: &str) -> Result<CargoManifest> {
    let toml_value: toml::Value = toml::from_str(manifest)?;

    let package = toml_value.get("package").ok_or_else(|| invalid("No [package] section in Cargo.toml"))?;

    let name = package
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("Missing 'name' in [package]"))?
        .to_string();

    // `version.workspace = true` is a table, not a string, and is not supported.
    let version = package
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("Missing 'version' in [package]"))?
        .to_string();

    // Try [[bin]] section first
    let binary_name = toml_value
        .get("bin")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("name"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(|| name.clone());

    let release = parse_release_config(package)?;

    Ok(CargoManifest {
        metadata: PackageMetadata { name, version },
        binary_name,
        release,
    })
}

fn parse_release_config(package: &toml::Value) -> Result<ReleaseConfig> {
    match package.get("metadata").and_then(|m| m.get("release")) {
        Some(table) => table.clone().try_into().map_err(|e: toml::de::Error| {
            invalid(&format!("Invalid [package.metadata.release]: {}", e.message()))
        }),
        None => {
            log::debug!("No [package.metadata.release] section, using defaults");
            Ok(ReleaseConfig::default())
        }
    }
}

fn invalid(reason: &str) -> ReleaseError {
    ReleaseError::Cli(CliError::InvalidArguments {
        reason: reason.to_string(),
    })
}
