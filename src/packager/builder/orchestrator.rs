//! Main pipeline orchestration.
//!
//! Runs the stages strictly in order and stops at the first error.

use super::manifest::{ArtifactKind, ReleaseArtifact, ReleaseManifest};
use crate::packager::{
    env::EnvironmentSnapshot,
    error::{Error, Result},
    exec::{CommandExecutor, ProcessExecutor},
    settings::Settings,
    stages::{archiver, byproduct, compile, installer, precondition, provision, stager, toolchain},
    utils::{fs, http::Downloader, http::HttpDownloader},
};

/// File name of the manifest written into the output root.
pub const MANIFEST_FILE: &str = "release-manifest.json";

/// Release packaging pipeline.
///
/// Generic over the subprocess and download seams so tests can run the
/// whole sequence without spawning processes or touching the network.
///
/// # Examples
///
/// ```no_run
/// use release_packager::packager::{Pipeline, SettingsBuilder};
///
/// # async fn example() -> release_packager::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root(".")
///     .product_name("OneTagger")
///     .version("1.7.0")
///     .binary_name("onetagger")
///     .build()?;
///
/// let manifest = Pipeline::new(settings).run().await?;
/// for artifact in &manifest.artifacts {
///     println!("{} ({} bytes) {}", artifact.path.display(), artifact.size, artifact.sha256);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline<E, D> {
    settings: Settings,
    executor: E,
    downloader: D,
    snapshot: EnvironmentSnapshot,
}

impl Pipeline<ProcessExecutor, HttpDownloader> {
    /// Pipeline that spawns real processes and downloads over HTTP, with
    /// the environment captured now.
    pub fn new(settings: Settings) -> Self {
        Self::with_parts(
            settings,
            ProcessExecutor,
            HttpDownloader::new(),
            EnvironmentSnapshot::capture(),
        )
    }
}

impl<E: CommandExecutor, D: Downloader> Pipeline<E, D> {
    pub fn with_parts(settings: Settings, executor: E, downloader: D, snapshot: EnvironmentSnapshot) -> Self {
        Self {
            settings,
            executor,
            downloader,
            snapshot,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Runs every stage and returns the manifest of produced artifacts.
    pub async fn run(&self) -> Result<ReleaseManifest> {
        let settings = &self.settings;
        let strategy = settings.strategy();

        // Nothing may start on an unsupported host or with a bad strategy
        // configuration, not even the UI build.
        precondition::check_platform(settings)?;
        let plan = provision::plan(strategy, &self.snapshot)?;
        log::info!(
            "Packaging {} {} (dependency strategy: {})",
            settings.product_name(),
            settings.version(),
            strategy
        );

        precondition::ensure_ui_bundle(&self.executor, settings).await?;

        fs::create_dir_all(settings.output_dir(), true).await?;

        let provisioned = provision::provision(&plan, settings, &self.executor, &self.downloader).await?;
        if let Some(key) = strategy
            .required_keys()
            .iter()
            .find(|key| !provisioned.overlay.contains_key(key))
        {
            return Err(Error::GenericError(format!(
                "{strategy} provisioning did not provide {key}"
            )));
        }

        toolchain::pin(&self.executor, settings).await?;
        compile::build(&self.executor, settings, &provisioned.overlay, &self.snapshot).await?;

        log::info!("Copying CEF runtime...");
        let staging = settings.staging_dir();
        let descriptor = byproduct::locate(&settings.build_output_dir()).await?;
        byproduct::relocate(&descriptor, &staging).await?;

        stager::stage_artifacts(settings, &provisioned, &staging).await?;

        let archive = archiver::create_archive(&self.executor, settings, &staging).await?;
        let installer = installer::generate_installer(&self.executor, settings).await?;

        let manifest = ReleaseManifest {
            product: settings.product_name().to_string(),
            version: settings.version().clone(),
            strategy,
            created_at: chrono::Utc::now(),
            artifacts: vec![
                ReleaseArtifact::from_path(ArtifactKind::Archive, archive).await?,
                ReleaseArtifact::from_path(ArtifactKind::Installer, installer).await?,
            ],
        };
        manifest
            .write(&settings.output_dir().join(MANIFEST_FILE))
            .await?;

        for artifact in &manifest.artifacts {
            log::info!("SHA256 {}  {}", artifact.sha256, artifact.path.display());
        }
        log::info!("✓ Release packaging complete");
        Ok(manifest)
    }
}
