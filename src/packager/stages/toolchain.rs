//! Toolchain channel pinning with rustup.

use super::Stage;
use crate::packager::{
    error::Result,
    exec::{CommandExecutor, Invocation, run_checked},
    settings::Settings,
};

/// Installs the configured channel and makes it the directory override.
///
/// Both rustup subcommands are no-ops when the channel is already installed
/// and pinned, so calling this repeatedly is safe.
pub async fn pin<E: CommandExecutor>(executor: &E, settings: &Settings) -> Result<()> {
    let channel = settings.toolchain();
    let root = settings.project_root();
    log::info!("Pinning toolchain {channel}...");

    run_checked(
        executor,
        Stage::Toolchain,
        Invocation::new("rustup", root).args(["toolchain", "install", channel]),
    )
    .await?;
    run_checked(
        executor,
        Stage::Toolchain,
        Invocation::new("rustup", root).args(["override", "set", channel]),
    )
    .await
}
