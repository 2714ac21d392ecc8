//! Reasons a single transport strategy gives up on a file.
//!
//! None of these abort a download by themselves: the strategy chain logs the
//! error as a failed attempt and hands the request to the next strategy.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of one strategy on one file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection, DNS or TLS failure, or a body stream that broke off.
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connect or idle-read deadline passed.
    #[error("timeout downloading {url}")]
    Timeout { url: String },

    /// Non-2xx response from the download host.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// Creating or writing the destination file failed.
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A download link or redirect target could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Body ended before the size the service promised.
    #[error("truncated download {path}: expected {expected} bytes, got {actual}")]
    Truncated {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Transfer finished with zero bytes on disk.
    #[error("empty response body written to {path}")]
    EmptyBody { path: PathBuf },

    /// Small image file that is really an HTML page.
    #[error("disguised error page written to {path} ({bytes} bytes of HTML)")]
    DisguisedErrorPage { path: PathBuf, bytes: u64 },

    /// 3xx response without a usable `Location`.
    #[error("redirect without location downloading {url} (HTTP {status})")]
    BadRedirect { url: String, status: u16 },

    /// Redirect walk hit the hop limit.
    #[error("too many redirects ({hops}) downloading {url}")]
    TooManyRedirects { url: String, hops: usize },

    /// File metadata carried no download link.
    #[error("file {file} has no download link")]
    MissingLink { file: String },

    /// A strategy's HTTP client could not be constructed.
    #[error("failed to build {strategy} HTTP client: {source}")]
    ClientBuild {
        strategy: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Maps a reqwest error to [`DownloadError::Timeout`] or [`DownloadError::Network`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn truncated(path: impl Into<PathBuf>, expected: u64, actual: u64) -> Self {
        Self::Truncated {
            path: path.into(),
            expected,
            actual,
        }
    }

    pub fn client_build(strategy: &'static str, source: reqwest::Error) -> Self {
        Self::ClientBuild { strategy, source }
    }

    /// True when the bytes arrived but failed verification.
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::EmptyBody { .. } | Self::DisguisedErrorPage { .. }
        )
    }
}
