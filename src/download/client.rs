//! HTTP plumbing shared by the transport strategies.
//!
//! Strategies differ in how they build clients and requests; the request
//! checking and the streaming write to disk live here so every strategy
//! writes files the same way.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{ClientBuilder, RequestBuilder, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::constants::{ACCOUNT_TOKEN_COOKIE, CHUNK_SIZE, SIGNATURE_SNIFF_LEN};
use super::error::DownloadError;
use super::progress::TransferProgress;

/// Bytes written by [`stream_to_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedFile {
    /// Total body bytes written.
    pub bytes_written: u64,
    /// Leading bytes of the body, for signature checks.
    pub head: Vec<u8>,
}

/// Client builder with a connect timeout and an idle read timeout.
///
/// The read timeout bounds the gap between body reads, not the whole
/// transfer, so large files are not cut off.
pub(crate) fn base_client_builder(connect_timeout_secs: u64, read_timeout_secs: u64) -> ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .read_timeout(Duration::from_secs(read_timeout_secs))
}

/// Sends `request` and rejects non-2xx responses.
pub(crate) async fn send_checked(
    request: RequestBuilder,
    url: &str,
) -> Result<Response, DownloadError> {
    let response = request
        .send()
        .await
        .map_err(|e| DownloadError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(url, status.as_u16()));
    }
    Ok(response)
}

/// Declared body length, if the server sent a parseable nonzero value.
pub(crate) fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&len| len > 0)
}

/// `Cookie` header value carrying the account token.
pub(crate) fn account_cookie(token: &str) -> String {
    format!("{ACCOUNT_TOKEN_COOKIE}={token}")
}

/// Streams the response body to `path`, creating or truncating it.
///
/// Removes the partial file when the transfer fails part-way.
pub(crate) async fn stream_to_path(
    response: Response,
    url: &str,
    path: &Path,
    progress: &TransferProgress,
) -> Result<StreamedFile, DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

    let result = write_body(file, response, url, path, progress).await;
    if result.is_err() {
        remove_partial(path).await;
    }
    result
}

async fn write_body(
    file: File,
    response: Response,
    url: &str,
    path: &Path,
    progress: &TransferProgress,
) -> Result<StreamedFile, DownloadError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;
    let mut head = Vec::with_capacity(SIGNATURE_SNIFF_LEN);

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        if head.len() < SIGNATURE_SNIFF_LEN {
            let take = (SIGNATURE_SNIFF_LEN - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
        progress.advance(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

    Ok(StreamedFile {
        bytes_written,
        head,
    })
}

/// Deletes a partially written file; a missing file is not an error.
pub(crate) async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
