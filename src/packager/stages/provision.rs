//! Audio codec dependency provisioning.
//!
//! Turns the selected [`DependencyStrategy`] into an [`EnvironmentOverlay`]
//! for the native build. Validation ([`plan`]) is separate from the work
//! ([`provision`]) so the orchestrator can reject a bad configuration
//! before anything touches the network or starts a subprocess.

use super::Stage;
use crate::packager::{
    env::{EnvironmentOverlay, EnvironmentSnapshot},
    error::{Error, ErrorExt, Result},
    exec::{CommandExecutor, Invocation, run_checked},
    settings::{DependencyStrategy, Settings},
    utils::{archive, fs, http::Downloader},
};
use std::path::{Path, PathBuf};

/// Prebuilt FFmpeg shared libraries for 64-bit Windows.
pub const FFMPEG_SHARED_URL: &str = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-master-latest-win64-lgpl-shared.zip";

/// pkg-config for Windows, used by `ffmpeg-sys` to discover the libraries.
pub const PKG_CONFIG_URL: &str =
    "https://downloads.sourceforge.net/project/pkgconfiglite/0.28-1/pkg-config-lite-0.28-1_bin-win32.zip";

/// vcpkg installation root.
pub const VCPKG_ROOT_VAR: &str = "VCPKG_ROOT";

/// vcpkg triplet for a static library with static CRT.
pub const VCPKG_TRIPLET: &str = "x64-windows-static";

/// Compiler flags requesting a statically linked C runtime.
pub const STATIC_CRT_RUSTFLAGS: &str = "-Ctarget-feature=+crt-static";

const DYLIB_SUFFIX: &str = ".dll";

/// A strategy whose prerequisites have been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProvisionPlan {
    None,
    DynamicBundle,
    StaticLink { vcpkg_root: PathBuf },
}

/// Output of the provisioning stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Provisioned {
    /// Environment additions for the native build.
    pub overlay: EnvironmentOverlay,
    /// Flattened directory of shared libraries to ship (dynamic bundle only).
    pub runtime_library_dir: Option<PathBuf>,
}

/// Checks the prerequisites of `strategy` against the ambient environment.
///
/// Touches neither the network nor any subprocess.
pub fn plan(strategy: DependencyStrategy, snapshot: &EnvironmentSnapshot) -> Result<ProvisionPlan> {
    match strategy {
        DependencyStrategy::None => Ok(ProvisionPlan::None),
        DependencyStrategy::DynamicBundle => Ok(ProvisionPlan::DynamicBundle),
        DependencyStrategy::StaticLink => {
            let root = snapshot
                .get(VCPKG_ROOT_VAR)
                .filter(|v| !v.to_string_lossy().trim().is_empty())
                .ok_or_else(|| Error::MissingEnvironment {
                    variable: VCPKG_ROOT_VAR,
                    reason: "is not set; static linking needs a vcpkg checkout".into(),
                })?;
            let vcpkg_root = PathBuf::from(root);
            if !vcpkg_root.is_dir() {
                return Err(Error::MissingEnvironment {
                    variable: VCPKG_ROOT_VAR,
                    reason: format!("does not name a directory ({})", vcpkg_root.display()),
                });
            }
            Ok(ProvisionPlan::StaticLink { vcpkg_root })
        }
    }
}

/// Executes `plan`, returning the overlay for the native build.
pub async fn provision<E, D>(
    plan: &ProvisionPlan,
    settings: &Settings,
    executor: &E,
    downloader: &D,
) -> Result<Provisioned>
where
    E: CommandExecutor,
    D: Downloader,
{
    match plan {
        ProvisionPlan::None => {
            log::info!("Audio codec dependency: assumed preinstalled");
            Ok(Provisioned::default())
        }
        ProvisionPlan::DynamicBundle => provision_dynamic(settings, downloader).await,
        ProvisionPlan::StaticLink { vcpkg_root } => provision_static(vcpkg_root, executor).await,
    }
}

async fn provision_dynamic<D: Downloader>(settings: &Settings, downloader: &D) -> Result<Provisioned> {
    log::info!("Provisioning FFmpeg shared libraries...");

    let deps_dir = settings.deps_dir();
    fs::create_dir_all(&deps_dir, true).await?;

    let ffmpeg_root = fetch_and_extract(downloader, FFMPEG_SHARED_URL, &deps_dir, "ffmpeg").await?;
    flatten_bin(&ffmpeg_root).await?;

    log::info!("Provisioning pkg-config...");
    let pkg_config_root =
        fetch_and_extract(downloader, PKG_CONFIG_URL, &deps_dir, "pkg-config").await?;

    let overlay = EnvironmentOverlay::new()
        .with_path("PATH", &ffmpeg_root)
        .with_path("PATH", pkg_config_root.join("bin"))
        .with_path("PKG_CONFIG_PATH", ffmpeg_root.join("lib").join("pkgconfig"))
        .with_var("FFMPEG_DIR", ffmpeg_root.display().to_string());

    log::info!("✓ FFmpeg shared build ready at {}", ffmpeg_root.display());
    Ok(Provisioned {
        overlay,
        runtime_library_dir: Some(ffmpeg_root),
    })
}

async fn provision_static<E: CommandExecutor>(vcpkg_root: &Path, executor: &E) -> Result<Provisioned> {
    log::info!("Building static FFmpeg with vcpkg ({VCPKG_TRIPLET})...");

    run_checked(
        executor,
        Stage::Provision,
        Invocation::new(vcpkg_root.join("vcpkg.exe"), vcpkg_root)
            .args(["install", &format!("ffmpeg:{VCPKG_TRIPLET}")]),
    )
    .await?;

    let lib_dir = vcpkg_root.join("installed").join(VCPKG_TRIPLET).join("lib");
    let overlay = EnvironmentOverlay::new()
        .with_path("LIB", &lib_dir)
        .with_var("RUSTFLAGS", STATIC_CRT_RUSTFLAGS);

    log::info!("✓ Static FFmpeg installed under {}", lib_dir.display());
    Ok(Provisioned {
        overlay,
        runtime_library_dir: None,
    })
}

/// Downloads `url` to `<deps>/<name>.zip`, extracts it to `<deps>/<name>`
/// and returns the package root.
async fn fetch_and_extract<D: Downloader>(
    downloader: &D,
    url: &str,
    deps_dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let archive_path = deps_dir.join(format!("{name}.zip"));
    downloader.download(url, &archive_path).await?;

    let extract_dir = deps_dir.join(name);
    archive::extract_zip(&archive_path, &extract_dir).await?;
    archive::package_root(&extract_dir).await
}

/// Moves every shared library out of `<root>/bin` into `root` and deletes
/// everything else in `bin`, then `bin` itself.
pub async fn flatten_bin(root: &Path) -> Result<()> {
    let bin = root.join("bin");
    if !bin.is_dir() {
        return Err(Error::MissingArtifact {
            what: "redistributable bin directory",
            path: bin,
        });
    }

    for file in fs::list_files(&bin).await? {
        let Some(name) = file.file_name() else {
            continue;
        };
        if fs::has_suffix(&name.to_string_lossy(), DYLIB_SUFFIX) {
            let dest = root.join(name);
            log::debug!("Relocating {} -> {}", file.display(), dest.display());
            tokio::fs::rename(&file, &dest)
                .await
                .fs_context("relocating shared library", &file)?;
        } else {
            tokio::fs::remove_file(&file)
                .await
                .fs_context("removing non-library file", &file)?;
        }
    }

    fs::remove_dir_all(&bin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{SettingsBuilder, exec::testing::RecordingExecutor};
    use std::io::Write;
    use std::sync::Mutex;

    /// Serves canned zip files keyed by URL.
    #[derive(Default)]
    struct ZipDownloader {
        requests: Mutex<Vec<String>>,
    }

    impl Downloader for ZipDownloader {
        async fn download(&self, url: &str, dest: &Path) -> Result<()> {
            self.requests.lock().unwrap().push(url.to_string());
            let entries: &[(&str, &str)] = if url == FFMPEG_SHARED_URL {
                &[
                    ("ffmpeg-shared/bin/avcodec-61.dll", "avcodec"),
                    ("ffmpeg-shared/bin/avformat-61.dll", "avformat"),
                    ("ffmpeg-shared/bin/ffmpeg.exe", "exe"),
                    ("ffmpeg-shared/bin/ffprobe.exe", "exe"),
                    ("ffmpeg-shared/lib/pkgconfig/libavcodec.pc", "pc"),
                ]
            } else {
                &[("pkg-config-lite-0.28-1/bin/pkg-config.exe", "pkgconf")]
            };
            let mut zip = zip::ZipWriter::new(std::fs::File::create(dest).unwrap());
            for (name, body) in entries {
                zip.start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
            Ok(())
        }
    }

    fn settings(root: &Path) -> Settings {
        SettingsBuilder::new()
            .project_root(root)
            .product_name("OneTagger")
            .version("1.0.0")
            .binary_name("onetagger")
            .seven_zip("7z")
            .makensis("makensis")
            .build()
            .unwrap()
    }

    #[test]
    fn static_link_without_vcpkg_root_is_missing_environment() {
        let snapshot: EnvironmentSnapshot = [("PATH", "/usr/bin")].into_iter().collect();
        let err = plan(DependencyStrategy::StaticLink, &snapshot).unwrap_err();
        assert!(matches!(err, Error::MissingEnvironment { variable: VCPKG_ROOT_VAR, .. }));
    }

    #[test]
    fn static_link_with_file_as_root_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("vcpkg");
        std::fs::write(&file, "").unwrap();
        let snapshot: EnvironmentSnapshot =
            [(VCPKG_ROOT_VAR, file.display().to_string())].into_iter().collect();
        let err = plan(DependencyStrategy::StaticLink, &snapshot).unwrap_err();
        assert!(err.to_string().contains("does not name a directory"));
    }

    #[tokio::test]
    async fn none_produces_empty_overlay_and_no_side_effects() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = RecordingExecutor::default();
        let dl = ZipDownloader::default();
        let out = provision(&ProvisionPlan::None, &settings(tmp.path()), &exec, &dl)
            .await
            .unwrap();
        assert!(out.overlay.is_empty());
        assert!(exec.calls().is_empty());
        assert!(dl.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn static_link_runs_vcpkg_and_sets_static_crt() {
        let vcpkg = tempfile::tempdir().unwrap();
        let snapshot: EnvironmentSnapshot =
            [(VCPKG_ROOT_VAR, vcpkg.path().display().to_string())].into_iter().collect();
        let planned = plan(DependencyStrategy::StaticLink, &snapshot).unwrap();

        let exec = RecordingExecutor::default();
        let project = tempfile::tempdir().unwrap();
        let out = provision(&planned, &settings(project.path()), &exec, &ZipDownloader::default())
            .await
            .unwrap();

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program_name(), "vcpkg");
        assert_eq!(calls[0].args, vec!["install", "ffmpeg:x64-windows-static"]);

        assert_eq!(out.overlay.var("RUSTFLAGS"), Some(STATIC_CRT_RUSTFLAGS));
        assert_eq!(
            out.overlay.paths("LIB"),
            &[vcpkg.path().join("installed").join(VCPKG_TRIPLET).join("lib")]
        );
        assert_eq!(out.runtime_library_dir, None);
    }

    #[tokio::test]
    async fn dynamic_bundle_flattens_and_builds_overlay() {
        let tmp = tempfile::tempdir().unwrap();
        let s = settings(tmp.path());
        let dl = ZipDownloader::default();

        let out = provision(&ProvisionPlan::DynamicBundle, &s, &RecordingExecutor::default(), &dl)
            .await
            .unwrap();

        let root = s.deps_dir().join("ffmpeg").join("ffmpeg-shared");
        assert_eq!(out.runtime_library_dir.as_deref(), Some(root.as_path()));
        assert!(root.join("avcodec-61.dll").is_file());
        assert!(root.join("avformat-61.dll").is_file());
        assert!(!root.join("ffmpeg.exe").exists());
        assert!(!root.join("bin").exists());

        for key in DependencyStrategy::DynamicBundle.required_keys() {
            assert!(out.overlay.contains_key(key), "missing {key}");
        }
        assert_eq!(out.overlay.paths("PATH")[0], root);
        assert_eq!(
            out.overlay.paths("PATH")[1],
            s.deps_dir().join("pkg-config").join("pkg-config-lite-0.28-1").join("bin")
        );
        assert_eq!(
            *dl.requests.lock().unwrap(),
            vec![FFMPEG_SHARED_URL.to_string(), PKG_CONFIG_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn dynamic_bundle_wipes_previous_deps() {
        let tmp = tempfile::tempdir().unwrap();
        let s = settings(tmp.path());
        std::fs::create_dir_all(s.deps_dir().join("leftover")).unwrap();

        provision(
            &ProvisionPlan::DynamicBundle,
            &s,
            &RecordingExecutor::default(),
            &ZipDownloader::default(),
        )
        .await
        .unwrap();
        assert!(!s.deps_dir().join("leftover").exists());
    }

    #[tokio::test]
    async fn flatten_leaves_nothing_in_bin() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("bin")).unwrap();
        for name in ["swresample-5.dll", "AVUTIL-59.DLL", "ffplay.exe", "LICENSE.txt"] {
            std::fs::write(root.join("bin").join(name), name).unwrap();
        }

        flatten_bin(root).await.unwrap();

        assert!(root.join("swresample-5.dll").is_file());
        assert!(root.join("AVUTIL-59.DLL").is_file());
        assert!(!root.join("ffplay.exe").exists());
        assert!(!root.join("LICENSE.txt").exists());
        assert!(!root.join("bin").exists());
    }

    #[tokio::test]
    async fn flatten_without_bin_is_missing_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let err = flatten_bin(tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }
}
