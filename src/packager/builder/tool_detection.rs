//! External tool detection.
//!
//! Looks tools up on `PATH` first and falls back to their default Windows
//! install locations.

use std::path::{Path, PathBuf};

const SEVEN_ZIP_FALLBACKS: &[&str] = &[r"C:\Program Files\7-Zip\7z.exe"];

const MAKENSIS_FALLBACKS: &[&str] = &[
    r"C:\Program Files (x86)\NSIS\makensis.exe",
    r"C:\Program Files\NSIS\makensis.exe",
];

/// Locates the 7-Zip command line tool.
pub fn locate_seven_zip() -> PathBuf {
    locate("7z", SEVEN_ZIP_FALLBACKS)
}

/// Locates the NSIS compiler.
pub fn locate_makensis() -> PathBuf {
    locate("makensis", MAKENSIS_FALLBACKS)
}

fn locate(name: &str, fallbacks: &[&str]) -> PathBuf {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            path
        }
        Err(e) => {
            if let Some(found) = fallbacks.iter().map(Path::new).find(|p| p.is_file()) {
                log::debug!("Found {} at: {}", name, found.display());
                return found.to_path_buf();
            }
            // Not fatal here; the stage that needs it reports the spawn failure.
            log::debug!("{} not found in PATH: {}", name, e);
            fallbacks
                .first()
                .map_or_else(|| PathBuf::from(name), PathBuf::from)
        }
    }
}
