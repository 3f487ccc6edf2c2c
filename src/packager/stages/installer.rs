//! NSIS installer image.
//!
//! The packaging script lives in the application repository and references
//! the staging tree itself. The pipeline only supplies the output file and
//! version defines.

use super::Stage;
use crate::packager::{
    error::{ErrorExt, Result},
    exec::{CommandExecutor, Invocation, run_checked},
    settings::Settings,
};
use std::path::PathBuf;

/// Runs makensis against the packaging script.
pub async fn generate_installer<E: CommandExecutor>(executor: &E, settings: &Settings) -> Result<PathBuf> {
    log::info!("Generating installer...");

    let installer = settings.installer_path();
    if let Some(parent) = installer.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating installer output directory", parent)?;
    }

    let invocation = Invocation::new(settings.makensis(), settings.project_root()).args([
        "-V3".to_string(),
        format!("-DOUTPUT_FILE={}", installer.display()),
        format!("-DVERSION={}", settings.version()),
        format!("-DVERSION_NSIS={}", format_version_for_nsis(settings.version())),
        settings.installer_script().display().to_string(),
    ]);
    run_checked(executor, Stage::Installer, invocation).await?;

    log::info!("✓ Created NSIS installer: {}", installer.display());
    Ok(installer)
}

/// Formats a version for NSIS `VIProductVersion`, which requires exactly
/// four numeric parts. Pre-release and build metadata are dropped.
pub fn format_version_for_nsis(version: &semver::Version) -> String {
    format!("{}.{}.{}.0", version.major, version.minor, version.patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{Error, SettingsBuilder, exec::CommandStatus, exec::testing::RecordingExecutor};

    #[test]
    fn nsis_version_has_four_parts() {
        let v = semver::Version::parse("1.7.0-beta.2+win").unwrap();
        assert_eq!(format_version_for_nsis(&v), "1.7.0.0");
    }

    #[tokio::test]
    async fn passes_defines_then_script() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .project_root(tmp.path())
            .product_name("OneTagger")
            .version("1.7.3")
            .binary_name("onetagger")
            .seven_zip("7z")
            .makensis("makensis")
            .build()
            .unwrap();
        let exec = RecordingExecutor::default();

        let installer = generate_installer(&exec, &settings).await.unwrap();

        let call = &exec.calls()[0];
        assert_eq!(call.program_name(), "makensis");
        assert_eq!(call.args[0], "-V3");
        assert_eq!(call.args[1], format!("-DOUTPUT_FILE={}", installer.display()));
        assert_eq!(call.args[2], "-DVERSION=1.7.3");
        assert_eq!(call.args[3], "-DVERSION_NSIS=1.7.3.0");
        assert_eq!(call.args[4], settings.installer_script().display().to_string());
    }

    #[tokio::test]
    async fn makensis_failure_is_pipeline_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .project_root(tmp.path())
            .product_name("OneTagger")
            .version("1.0.0")
            .binary_name("onetagger")
            .seven_zip("7z")
            .makensis("makensis")
            .build()
            .unwrap();
        let exec = RecordingExecutor::with_hook(|_| CommandStatus { code: Some(1) });
        let err = generate_installer(&exec, &settings).await.unwrap_err();
        assert!(matches!(err, Error::ToolInvocation { stage: Stage::Installer, .. }));
    }
}
