//! CEF runtime payload discovery.
//!
//! `cef-sys` unpacks the browser runtime into `target/release/build/cef-sys-<hash>/out`.
//! The hash changes between builds, so the directory is found by prefix.
//! Its `out` directory, minus the downloaded `.tar.bz2` distribution,
//! becomes the staging tree.

use crate::packager::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Name prefix of the build-script output directory.
pub const CEF_DIR_PREFIX: &str = "cef-sys-";

/// Subdirectory that must exist for a candidate to qualify.
pub const MARKER_DIR: &str = "out";

/// Compressed sidecar files dropped before relocation.
pub const ARCHIVE_SUFFIX: &str = ".tar.bz2";

/// A discovered byproduct directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByproductDescriptor {
    /// The `cef-sys-*` directory.
    pub dir: PathBuf,
    /// Its marker subdirectory, the payload to move.
    pub marker: PathBuf,
}

/// Picks the byproduct directory from a listing of candidate names.
///
/// Names carrying `prefix` are tried in lexicographic order; the first for
/// which `has_marker` returns true is returned and no further candidates are
/// inspected.
pub fn select_byproduct<'a, S, F>(candidates: &'a [S], prefix: &str, mut has_marker: F) -> Option<&'a str>
where
    S: AsRef<str>,
    F: FnMut(&str) -> bool,
{
    let mut matching: Vec<&str> = candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| name.starts_with(prefix))
        .collect();
    matching.sort_unstable();
    matching.into_iter().find(|name| has_marker(name))
}

/// Scans `build_dir` for the CEF payload.
pub async fn locate(build_dir: &Path) -> Result<ByproductDescriptor> {
    let missing = || Error::MissingByproduct {
        search_dir: build_dir.to_path_buf(),
        prefix: CEF_DIR_PREFIX,
        marker: MARKER_DIR,
    };

    if !build_dir.is_dir() {
        return Err(missing());
    }

    let names = fs::list_dir_names(build_dir).await?;
    let name = select_byproduct(&names, CEF_DIR_PREFIX, |name| {
        build_dir.join(name).join(MARKER_DIR).is_dir()
    })
    .ok_or_else(missing)?;

    let dir = build_dir.join(name);
    log::debug!("Found CEF payload in {}", dir.display());
    Ok(ByproductDescriptor {
        marker: dir.join(MARKER_DIR),
        dir,
    })
}

/// Deletes archive sidecars from the marker directory and moves it to
/// `staging`, which becomes the staging tree.
pub async fn relocate(descriptor: &ByproductDescriptor, staging: &Path) -> Result<()> {
    for file in fs::list_files(&descriptor.marker).await? {
        let is_archive = file
            .file_name()
            .is_some_and(|n| fs::has_suffix(&n.to_string_lossy(), ARCHIVE_SUFFIX));
        if is_archive {
            log::debug!("Removing {}", file.display());
            tokio::fs::remove_file(&file)
                .await
                .fs_context("removing archive sidecar", &file)?;
        }
    }

    fs::remove_dir_all(staging).await?;
    fs::move_dir(&descriptor.marker, staging).await
}
