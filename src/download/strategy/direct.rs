//! Direct streaming fetch: HEAD probe, then a plain streaming GET.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::COOKIE;
use tracing::{debug, instrument};

use super::{DownloadRequest, StrategyKind, TransportStrategy, finish_verified};
use crate::config::GofileConfig;
use crate::download::DownloadError;
use crate::download::client::{
    account_cookie, base_client_builder, content_length, send_checked, stream_to_path,
};
use crate::download::constants::{
    DIRECT_CONNECT_TIMEOUT_SECS, DIRECT_READ_TIMEOUT_SECS, HEAD_TIMEOUT_SECS,
};
use crate::download::progress::TransferProgress;
use crate::download::verify::VerifyPolicy;
use crate::user_agent::BROWSER_USER_AGENT;

/// Cheapest strategy: one pooled client, browser user agent, no session.
#[derive(Debug, Clone)]
pub struct DirectStrategy {
    client: Client,
    token: Option<String>,
    show_progress: bool,
}

impl DirectStrategy {
    /// Builds the strategy's client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn new(config: &GofileConfig) -> Result<Self, DownloadError> {
        let client = base_client_builder(DIRECT_CONNECT_TIMEOUT_SECS, DIRECT_READ_TIMEOUT_SECS)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| DownloadError::client_build(StrategyKind::Direct.name(), e))?;
        Ok(Self {
            client,
            token: config.token.clone(),
            show_progress: config.show_progress,
        })
    }

    fn with_token(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request = request.header(COOKIE, account_cookie(token));
        }
        request
    }

    /// Content length from a HEAD request; any failure yields `None`.
    async fn probe_length(&self, url: &str) -> Option<u64> {
        let request = self
            .with_token(self.client.head(url))
            .timeout(Duration::from_secs(HEAD_TIMEOUT_SECS));
        match send_checked(request, url).await {
            Ok(response) => content_length(&response),
            Err(error) => {
                debug!(error = %error, "HEAD probe failed, using GET length");
                None
            }
        }
    }
}

#[async_trait]
impl TransportStrategy for DirectStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn attempt(&self, request: &DownloadRequest) -> Result<u64, DownloadError> {
        let head_length = self.probe_length(&request.url).await;

        let response = send_checked(
            self.with_token(self.client.get(&request.url)),
            &request.url,
        )
        .await?;

        let expected = request
            .expected_size
            .or(head_length)
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
