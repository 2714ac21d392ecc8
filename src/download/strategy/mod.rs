//! Transport strategies for fetching one URL to one local file.
//!
//! Each strategy is an independent way of getting the bytes past the host's
//! bot mitigation. The [`StrategyChain`](super::StrategyChain) runs them in
//! priority order until one succeeds.

mod browser;
mod direct;
mod low_level;
mod session;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use browser::BrowserStrategy;
pub use direct::DirectStrategy;
pub use low_level::LowLevelStrategy;
pub use session::SessionStrategy;

use super::DownloadError;
use super::client::{StreamedFile, remove_partial};
use super::verify::{VerifyPolicy, verify};
use crate::config::GofileConfig;
use crate::resolver::ContentId;

/// Identity of a transport strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Plain streaming GET after a HEAD probe.
    Direct,
    /// Minimal HTTP/1.1 transport with a bare header set.
    LowLevel,
    /// Cookie session with explicit redirect handling.
    Session,
    /// Full browser simulation with page visits before the download.
    Browser,
}

impl StrategyKind {
    /// Short stable name used in logs and summaries.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::LowLevel => "low-level",
            Self::Session => "session",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One file to fetch: where from, where to, and what the API said about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Download link.
    pub url: String,
    /// Exact destination path; an existing file is overwritten.
    pub destination: PathBuf,
    /// Name shown on the progress bar and in logs.
    pub display_name: String,
    /// Size declared by the metadata API.
    pub expected_size: Option<u64>,
    /// Id of the file itself, for API download URL variants.
    pub content_id: Option<ContentId>,
    /// Id of the human-facing page that lists the file.
    pub page_id: Option<ContentId>,
}

impl DownloadRequest {
    /// Creates a request with no metadata hints.
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        let display_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            url: url.into(),
            destination,
            display_name,
            expected_size: None,
            content_id: None,
            page_id: None,
        }
    }

    /// Sets the progress/log display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the size declared by the API.
    #[must_use]
    pub fn with_expected_size(mut self, size: Option<u64>) -> Self {
        self.expected_size = size;
        self
    }

    /// Sets the file's content id.
    #[must_use]
    pub fn with_content_id(mut self, id: ContentId) -> Self {
        self.content_id = Some(id);
        self
    }

    /// Sets the id of the page listing the file.
    #[must_use]
    pub fn with_page_id(mut self, id: ContentId) -> Self {
        self.page_id = Some(id);
        self
    }

    /// Destination file name, used for extension-based checks.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A way of fetching one URL to one local path.
///
/// Implementations write to `request.destination` and return the bytes written.
/// On any failure they remove their own partial output before returning.
#[async_trait]
pub trait TransportStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Attempts the download once.
    async fn attempt(&self, request: &DownloadRequest) -> Result<u64, DownloadError>;
}

/// The four built-in strategies in priority order: cheapest first.
///
/// # Errors
///
/// Returns [`DownloadError::ClientBuild`] when a strategy's HTTP client cannot
/// be constructed.
pub fn default_strategies(
    config: &GofileConfig,
) -> Result<Vec<Box<dyn TransportStrategy>>, DownloadError> {
    Ok(vec![
        Box::new(DirectStrategy::new(config)?),
        Box::new(LowLevelStrategy::new(config)?),
        Box::new(SessionStrategy::new(config)?),
        Box::new(BrowserStrategy::new(config)),
    ])
}

/// Runs the post-write checks and removes the file when they fail.
pub(crate) async fn finish_verified(
    path: &Path,
    expected: Option<u64>,
    streamed: &StreamedFile,
    file_name: &str,
    policy: VerifyPolicy,
) -> Result<u64, DownloadError> {
    let verdict = verify(
        expected,
        streamed.bytes_written,
        &streamed.head,
        file_name,
        policy,
    );
    if let Err(error) = verdict.into_result(path) {
        remove_partial(path).await;
        return Err(error);
    }
    Ok(streamed.bytes_written)
}
