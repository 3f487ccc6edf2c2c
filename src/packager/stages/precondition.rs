//! Host platform check and UI bundle build.

use super::Stage;
use crate::packager::{
    error::{Error, Result},
    exec::{CommandExecutor, Invocation, run_checked},
    settings::{SUPPORTED_OS, Settings},
};

/// Fails with [`Error::PlatformUnsupported`] unless the host is Windows.
pub fn check_platform(settings: &Settings) -> Result<()> {
    if settings.host_os() != SUPPORTED_OS {
        return Err(Error::PlatformUnsupported {
            host: settings.host_os().to_string(),
            required: SUPPORTED_OS,
        });
    }
    Ok(())
}

/// Builds the UI bundle unless its marker file already exists.
///
/// Runs `npm i` then `npm run build` in the UI directory. Either exiting
/// non-zero aborts the pipeline.
pub async fn ensure_ui_bundle<E: CommandExecutor>(executor: &E, settings: &Settings) -> Result<()> {
    let marker = settings.ui_marker();
    if marker.is_file() {
        log::info!("UI bundle already built ({})", marker.display());
        return Ok(());
    }

    log::info!("Compiling UI...");
    let ui_dir = settings.ui_dir();
    run_checked(executor, Stage::Precondition, Invocation::new("npm", ui_dir).arg("i")).await?;
    run_checked(
        executor,
        Stage::Precondition,
        Invocation::new("npm", ui_dir).args(["run", "build"]),
    )
    .await?;

    log::info!("✓ UI bundle built");
    Ok(())
}
