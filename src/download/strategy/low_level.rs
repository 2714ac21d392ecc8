//! Low-level streaming fetch through a minimal transport.
//!
//! Used when the pooled client of the direct strategy is itself the problem:
//! HTTP/1.1 only, no compression negotiation, no connection reuse and a bare
//! header set.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONNECTION, COOKIE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use tracing::instrument;

use super::{DownloadRequest, StrategyKind, TransportStrategy, finish_verified};
use crate::config::GofileConfig;
use crate::download::DownloadError;
use crate::download::client::{
    account_cookie, base_client_builder, content_length, send_checked, stream_to_path,
};
use crate::download::constants::{LOW_LEVEL_CONNECT_TIMEOUT_SECS, LOW_LEVEL_READ_TIMEOUT_SECS};
use crate::download::progress::TransferProgress;
use crate::download::verify::VerifyPolicy;
use crate::user_agent::BROWSER_USER_AGENT;

const MAX_REDIRECTS: usize = 5;

/// Minimal-transport strategy with the same write discipline as the direct one.
#[derive(Debug, Clone)]
pub struct LowLevelStrategy {
    client: Client,
    token: Option<String>,
    show_progress: bool,
}

impl LowLevelStrategy {
    /// Builds the minimal client.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn new(config: &GofileConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let client =
            base_client_builder(LOW_LEVEL_CONNECT_TIMEOUT_SECS, LOW_LEVEL_READ_TIMEOUT_SECS)
                .http1_only()
                .no_gzip()
                .pool_max_idle_per_host(0)
                .redirect(Policy::limited(MAX_REDIRECTS))
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(headers)
                .build()
                .map_err(|e| DownloadError::client_build(StrategyKind::LowLevel.name(), e))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            show_progress: config.show_progress,
        })
    }
}

#[async_trait]
impl TransportStrategy for LowLevelStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LowLevel
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn attempt(&self, request: &DownloadRequest) -> Result<u64, DownloadError> {
        let mut get = self.client.get(&request.url);
        if let Some(token) = &self.token {
            get = get.header(COOKIE, account_cookie(token));
        }
        let response = send_checked(get, &request.url).await?;

        let expected = request
            .expected_size
            .or_else(|| content_length(&response));

        let progress = TransferProgress::new(&request.display_name, expected, self.show_progress);
        let streamed =
            stream_to_path(response, &request.url, &request.destination, &progress).await;
        progress.finish();
        let streamed = streamed?;

        finish_verified(
            &request.destination,
            expected,
            &streamed,
            &request.file_name(),
            VerifyPolicy::STREAMING,
        )
        .await
    }
}
