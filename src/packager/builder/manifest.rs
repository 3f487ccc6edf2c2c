//! Release manifest written next to the final artifacts.

use super::checksum::calculate_sha256;
use crate::packager::{
    error::{Error, ErrorExt, Result},
    settings::DependencyStrategy,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Kind of release artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Archive,
    Installer,
}

/// One finished distributable.
#[derive(Clone, Debug, Serialize)]
pub struct ReleaseArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

impl ReleaseArtifact {
    /// Describes the file at `path`, which must exist.
    pub async fn from_path(kind: ArtifactKind, path: PathBuf) -> Result<Self> {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            _ => {
                return Err(Error::MissingArtifact {
                    what: match kind {
                        ArtifactKind::Archive => "release archive",
                        ArtifactKind::Installer => "installer image",
                    },
                    path,
                });
            }
        };
        let sha256 = calculate_sha256(&path).await?;
        Ok(Self {
            kind,
            size: metadata.len(),
            sha256,
            path,
        })
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, Serialize)]
pub struct ReleaseManifest {
    pub product: String,
    pub version: semver::Version,
    pub strategy: DependencyStrategy,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub artifacts: Vec<ReleaseArtifact>,
}

impl ReleaseManifest {
    /// Writes the manifest as pretty JSON.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::GenericError(format!("serializing release manifest: {e}")))?;
        tokio::fs::write(path, json)
            .await
            .fs_context("writing release manifest", path)
    }
}
