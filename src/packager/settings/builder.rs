//! Builder for constructing Settings.

use super::{DependencyStrategy, Settings};
use crate::packager::{
    builder::tool_detection,
    error::{Context, Error, ErrorExt, Result},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use release_packager::packager::{DependencyStrategy, SettingsBuilder};
///
/// # fn example() -> release_packager::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root("C:/src/onetagger")
///     .product_name("OneTagger")
///     .version("1.7.0")
///     .binary_name("onetagger")
///     .strategy(DependencyStrategy::DynamicBundle)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    project_root: Option<PathBuf>,
    product_name: Option<String>,
    version: Option<String>,
    binary_name: Option<String>,
    strategy: DependencyStrategy,
    toolchain: Option<String>,
    ui_dir: Option<PathBuf>,
    icon: Option<PathBuf>,
    installer_script: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    host_os: Option<String>,
    seven_zip: Option<PathBuf>,
    makensis: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application workspace root.
    ///
    /// # Required
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// # Required
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Product version; must be valid semver.
    ///
    /// # Required
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Binary name without the `.exe` suffix.
    ///
    /// # Required
    pub fn binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = Some(name.into());
        self
    }

    /// Default: [`DependencyStrategy::None`]
    pub fn strategy(mut self, strategy: DependencyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Default: `nightly`
    pub fn toolchain(mut self, channel: impl Into<String>) -> Self {
        self.toolchain = Some(channel.into());
        self
    }

    /// Default: `client`
    pub fn ui_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.ui_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `assets/icon.ico`
    pub fn icon<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `assets/installer.nsi`
    pub fn installer_script<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.installer_script = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `dist`
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides host OS detection.
    ///
    /// Default: `std::env::consts::OS`
    pub fn host_os(mut self, os: impl Into<String>) -> Self {
        self.host_os = Some(os.into());
        self
    }

    /// Default: detected with [`tool_detection::locate_seven_zip`]
    pub fn seven_zip<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.seven_zip = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: detected with [`tool_detection::locate_makensis`]
    pub fn makensis<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.makensis = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the [`Settings`].
    ///
    /// Relative paths are resolved against the project root.
    pub fn build(self) -> Result<Settings> {
        let project_root = self
            .project_root
            .context("project root is required")?;
        let product_name = self
            .product_name
            .context("product name is required")?;
        let binary_name = self
            .binary_name
            .context("binary name is required")?;
        let version = self
            .version
            .context("version is required")?;
        let version = semver::Version::parse(&version)
            .map_err(|e| Error::GenericError(format!("invalid version `{version}`: {e}")))?;

        let resolve = |path: Option<PathBuf>, default: &str| {
            let path = path.unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                project_root.join(path)
            }
        };

        // The output root is erased on every run.
        let output_dir = resolve(self.output_dir, "dist");
        if encloses(&output_dir, &project_root)? {
            return Err(Error::GenericError(format!(
                "output directory {} must not be the project root or one of its ancestors",
                output_dir.display()
            )));
        }

        Ok(Settings {
            ui_dir: resolve(self.ui_dir, "client"),
            icon: resolve(self.icon, "assets/icon.ico"),
            installer_script: resolve(self.installer_script, "assets/installer.nsi"),
            output_dir,
            toolchain: self.toolchain.unwrap_or_else(|| "nightly".to_string()),
            host_os: self
                .host_os
                .unwrap_or_else(|| std::env::consts::OS.to_string()),
            seven_zip: self.seven_zip.unwrap_or_else(tool_detection::locate_seven_zip),
            makensis: self.makensis.unwrap_or_else(tool_detection::locate_makensis),
            strategy: self.strategy,
            version,
            binary_name,
            product_name,
            project_root,
        })
    }
}

/// Whether `dir` equals `path` or is one of its ancestors, after resolving
/// `.` and `..` lexically.
fn encloses(dir: &Path, path: &Path) -> Result<bool> {
    let dir = dir
        .absolutize()
        .fs_context("resolving output directory", dir)?;
    let path = path
        .absolutize()
        .fs_context("resolving project root", path)?;
    Ok(path.starts_with(&dir))
}
