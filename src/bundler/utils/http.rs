//! HTTP utilities for downloading bundle inputs.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Streams `url` into `dest`, returning the number of bytes written.
///
/// Any transport error or non-success status is reported as
/// [`Error::DownloadFailure`]; nothing is retried.
pub async fn download_to_file(url: &str, dest: &Path, timeout: Option<Duration>) -> Result<u64> {
    log::info!("Downloading {}", url);

    let failure = |reason: String| Error::DownloadFailure {
        url: url.to_string(),
        reason,
    };

    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(|e| failure(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failure(e.to_string()))?
        .error_for_status()
        .map_err(|e| failure(e.to_string()))?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .fs_context("creating download file", dest)?;
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| failure(format!("failed to read response: {e}")))?
    {
        file.write_all(&chunk)
            .await
            .fs_context("writing download file", dest)?;
        written += chunk.len() as u64;
    }
    file.flush().await.fs_context("flushing download file", dest)?;

    log::debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(written)
}
