//! Command line interface for the release packager.
//!
//! Resolves configuration (flags, then `[package.metadata.release]`, then
//! defaults) into [`Settings`] and runs the [`Pipeline`].

mod args;

pub use args::Args;

use crate::error::{CliError, ReleaseError, Result};
use crate::metadata::{self, CargoManifest};
use crate::packager::settings::SUPPORTED_OS;
use crate::packager::{DependencyStrategy, Pipeline, Settings, SettingsBuilder};
use path_absolutize::Absolutize;
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    // Runs before argument parsing, so even `--help` reports the host.
    check_host(std::env::consts::OS)?;
    let args = Args::parse_args();
    let settings = resolve_settings(&args)?;
    Pipeline::new(settings).run().await?;
    Ok(0)
}

fn check_host(os: &str) -> Result<()> {
    if os != SUPPORTED_OS {
        return Err(crate::packager::Error::PlatformUnsupported {
            host: os.to_string(),
            required: SUPPORTED_OS,
        }
        .into());
    }
    Ok(())
}

/// Builds the pipeline settings from arguments and the project manifest.
pub fn resolve_settings(args: &Args) -> Result<Settings> {
    let project_root = args
        .project_root
        .absolutize()
        .map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Cannot resolve project root {}: {}", args.project_root.display(), e),
            })
        })?
        .into_owned();
    log::debug!("Project root: {}", project_root.display());

    let manifest = metadata::load_manifest(&project_root.join("Cargo.toml"))?;
    Ok(settings_from_manifest(&project_root, &manifest, args.strategy)?)
}

fn settings_from_manifest(
    project_root: &Path,
    manifest: &CargoManifest,
    strategy: Option<DependencyStrategy>,
) -> crate::packager::Result<Settings> {
    let release = &manifest.release;
    let mut builder = SettingsBuilder::new()
        .project_root(project_root)
        .product_name(
            release
                .product_name
                .clone()
                .unwrap_or_else(|| manifest.metadata.name.clone()),
        )
        .version(manifest.metadata.version.clone())
        .binary_name(manifest.binary_name.clone())
        .strategy(strategy.or(release.strategy).unwrap_or_default());

    if let Some(icon) = &release.icon {
        builder = builder.icon(icon);
    }
    if let Some(script) = &release.installer_script {
        builder = builder.installer_script(script);
    }
    if let Some(ui_dir) = &release.ui_dir {
        builder = builder.ui_dir(ui_dir);
    }
    if let Some(toolchain) = &release.toolchain {
        builder = builder.toolchain(toolchain.clone());
    }
    if let Some(output_dir) = &release.output_dir {
        builder = builder.output_dir(output_dir);
    }

    builder.build()
}
