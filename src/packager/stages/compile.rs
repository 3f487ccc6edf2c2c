//! Native release build.

use super::Stage;
use crate::packager::{
    env::{EnvironmentOverlay, EnvironmentSnapshot},
    error::Result,
    exec::{CommandExecutor, Invocation, run_checked},
    settings::Settings,
};

/// Runs `cargo build --release` with `overlay` layered over `snapshot`.
pub async fn build<E: CommandExecutor>(
    executor: &E,
    settings: &Settings,
    overlay: &EnvironmentOverlay,
    snapshot: &EnvironmentSnapshot,
) -> Result<()> {
    log::info!("Compiling...");
    for key in overlay.keys() {
        log::debug!("build environment override: {key}");
    }

    let env = overlay.merge_over(snapshot)?;
    run_checked(
        executor,
        Stage::Compile,
        Invocation::new("cargo", settings.project_root())
            .args(["build", "--release"])
            .env(env),
    )
    .await?;

    log::info!("✓ Native build finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{SettingsBuilder, exec::testing::RecordingExecutor};
    use std::ffi::OsStr;

    #[tokio::test]
    async fn passes_merged_environment() {
        let settings = SettingsBuilder::new()
            .project_root("/work/app")
            .product_name("OneTagger")
            .version("1.0.0")
            .binary_name("onetagger")
            .seven_zip("7z")
            .makensis("makensis")
            .build()
            .unwrap();
        let snapshot: EnvironmentSnapshot = [("HOME", "/home/b"), ("LIB", "/sys/lib")].into_iter().collect();
        let overlay = EnvironmentOverlay::new()
            .with_path("LIB", "/vcpkg/lib")
            .with_var("RUSTFLAGS", "-Ctarget-feature=+crt-static");

        let exec = RecordingExecutor::default();
        build(&exec, &settings, &overlay, &snapshot).await.unwrap();

        let call = &exec.calls()[0];
        assert_eq!(call.args, vec!["build", "--release"]);
        let env = call.env.as_ref().unwrap();
        assert_eq!(env[OsStr::new("HOME")], *"/home/b");
        assert_eq!(env[OsStr::new("RUSTFLAGS")], *"-Ctarget-feature=+crt-static");
        let lib: Vec<_> = std::env::split_paths(&env[OsStr::new("LIB")]).collect();
        assert_eq!(lib, vec![std::path::PathBuf::from("/vcpkg/lib"), "/sys/lib".into()]);
    }
}
