//! Copies the application binary, icon and runtime libraries into the staging tree.

use crate::packager::{
    error::{Context, Error, Result},
    settings::Settings,
    stages::provision::Provisioned,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Populates `staging` with the binary, the icon and, under the dynamic
/// bundle strategy, every shared library from the flattened dependency root.
///
/// Returns the number of files copied.
pub async fn stage_artifacts(settings: &Settings, provisioned: &Provisioned, staging: &Path) -> Result<usize> {
    log::info!("Copying output files...");

    let mut copied = 0;
    copy_into(&settings.binary_path(), staging, "binary").await?;
    copied += 1;
    copy_into(settings.icon(), staging, "icon").await?;
    copied += 1;

    if settings.strategy().stages_runtime_libraries() {
        let lib_dir = provisioned
            .runtime_library_dir
            .as_deref()
            .context("dynamic bundle strategy produced no runtime library directory")?;
        for library in runtime_libraries(lib_dir)? {
            log::debug!("Staging runtime library {}", library.display());
            copy_into(&library, staging, "runtime library").await?;
            copied += 1;
        }
    }

    log::info!("✓ Staged {} file(s) into {}", copied, staging.display());
    Ok(copied)
}

async fn copy_into(source: &Path, staging: &Path, what: &'static str) -> Result<()> {
    let name = source.file_name().ok_or_else(|| Error::MissingArtifact {
        what,
        path: source.to_path_buf(),
    })?;
    fs::copy_file(source, &staging.join(name), what).await
}

/// Every `*.dll` directly inside `lib_dir`, sorted.
fn runtime_libraries(lib_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.dll", glob::Pattern::escape(&lib_dir.to_string_lossy()));
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut libraries = Vec::new();
    for entry in glob::glob_with(&pattern, options)
        .map_err(|e| Error::GenericError(format!("invalid library pattern {pattern}: {e}")))?
    {
        let path = entry.map_err(|e| Error::GenericError(format!("reading {}: {e}", lib_dir.display())))?;
        if path.is_file() {
            libraries.push(path);
        }
    }
    libraries.sort();
    Ok(libraries)
}
