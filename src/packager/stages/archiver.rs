//! 7-Zip release archive.

use super::Stage;
use crate::packager::{
    error::Result,
    exec::{CommandExecutor, Invocation, run_checked},
    settings::Settings,
};
use std::path::PathBuf;

/// Maximum compression, eight threads.
pub const COMPRESSION_PROFILE: [&str; 2] = ["-mmt8", "-mx9"];

/// Compresses `staging` into `<output>/<Product>-windows.7z`.
pub async fn create_archive<E: CommandExecutor>(
    executor: &E,
    settings: &Settings,
    staging: &std::path::Path,
) -> Result<PathBuf> {
    log::info!("Generating archive...");

    let archive = settings.archive_path();
    let invocation = Invocation::new(settings.seven_zip(), settings.project_root())
        .arg("a")
        .arg(archive.display().to_string())
        .args(COMPRESSION_PROFILE)
        .arg(staging.display().to_string());
    run_checked(executor, Stage::Archive, invocation).await?;

    log::info!("✓ Created archive: {}", archive.display());
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{SettingsBuilder, exec::testing::RecordingExecutor};

    #[tokio::test]
    async fn invokes_seven_zip_with_fixed_profile() {
        let settings = SettingsBuilder::new()
            .project_root("/work/app")
            .product_name("OneTagger")
            .version("1.0.0")
            .binary_name("onetagger")
            .seven_zip("/opt/7z")
            .makensis("makensis")
            .build()
            .unwrap();
        let exec = RecordingExecutor::default();

        let archive = create_archive(&exec, &settings, &settings.staging_dir()).await.unwrap();

        let call = &exec.calls()[0];
        assert_eq!(call.program, std::path::Path::new("/opt/7z"));
        assert_eq!(
            call.args,
            vec![
                "a".to_string(),
                archive.display().to_string(),
                "-mmt8".into(),
                "-mx9".into(),
                settings.staging_dir().display().to_string(),
            ]
        );
        assert!(archive.ends_with("OneTagger-windows.7z"));
    }
}
