//! Zip extraction for downloaded redistributables.

use crate::packager::error::{Error, Result};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Extracts `archive` into `dest`, creating it.
pub async fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    log::debug!("Extracting {} into {}", archive.display(), dest.display());

    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let extract_err = |reason: String| Error::Extract {
            archive: archive.clone(),
            reason,
        };

        let file = std::fs::File::open(&archive).map_err(|e| extract_err(e.to_string()))?;
        let mut zip =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| extract_err(e.to_string()))?;
        std::fs::create_dir_all(&dest).map_err(|e| extract_err(e.to_string()))?;
        zip.extract(&dest).map_err(|e| extract_err(e.to_string()))
    })
    .await
    .map_err(|e| Error::GenericError(format!("Extraction task panicked: {e}")))?
}

/// Returns the package root inside an extraction directory.
///
/// Redistributable zips usually wrap everything in one top-level folder;
/// when `dir` holds exactly one directory and nothing else, that directory
/// is the root. Otherwise `dir` itself is.
pub async fn package_root(dir: &Path) -> Result<PathBuf> {
    let names = super::fs::list_dir_names(dir).await?;
    let files = super::fs::list_files(dir).await?;
    match (names.as_slice(), files.is_empty()) {
        ([only], true) => Ok(dir.join(only)),
        _ => Ok(dir.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_and_finds_wrapped_root() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("ffmpeg.zip");
        write_zip(
            &archive,
            &[
                ("ffmpeg-shared/bin/avcodec-61.dll", "codec"),
                ("ffmpeg-shared/lib/avcodec.lib", "lib"),
            ],
        );

        let dest = tmp.path().join("out");
        extract_zip(&archive, &dest).await.unwrap();

        let root = package_root(&dest).await.unwrap();
        assert_eq!(root, dest.join("ffmpeg-shared"));
        assert!(root.join("bin/avcodec-61.dll").is_file());
    }

    #[tokio::test]
    async fn flat_archive_root_is_extraction_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("flat.zip");
        write_zip(&archive, &[("bin/pkg-config.exe", "x"), ("README", "r")]);

        let dest = tmp.path().join("out");
        extract_zip(&archive, &dest).await.unwrap();
        assert_eq!(package_root(&dest).await.unwrap(), dest);
    }

    #[tokio::test]
    async fn corrupt_archive_is_extract_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("bad.zip");
        std::fs::write(&archive, "not a zip").unwrap();
        let err = extract_zip(&archive, &tmp.path().join("out")).await.unwrap_err();
        assert!(matches!(err, Error::Extract { .. }));
    }
}
