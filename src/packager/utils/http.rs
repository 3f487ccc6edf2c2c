//! HTTP downloads for redistributable packages.

use crate::packager::error::{Error, ErrorExt, Result};
use futures_lite::StreamExt;
use std::future::Future;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Fetches a URL into a file.
pub trait Downloader {
    /// Downloads `url` to `dest`, overwriting it. No retry, no resume.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>>;
}

/// Streams response bodies to disk with reqwest.
#[derive(Clone, Debug, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        let mut reader: tokio_util::io::StreamReader<_, bytes::Bytes> =
            tokio_util::io::StreamReader::new(Box::pin(stream));

        let mut file = tokio::fs::File::create(dest)
            .await
            .fs_context("creating download file", dest)?;
        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| Error::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        file.flush().await.fs_context("flushing download", dest)?;

        log::debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(())
    }
}
