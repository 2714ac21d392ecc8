//! Session fetch: persistent cookies, alternate browser headers, manual redirects.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{DownloadRequest, StrategyKind, TransportStrategy, finish_verified};
use crate::config::GofileConfig;
use crate::download::DownloadError;
use crate::download::client::{account_cookie, base_client_builder, content_length, stream_to_path};
use crate::download::constants::{
    MAX_SESSION_REDIRECTS, SESSION_CONNECT_TIMEOUT_SECS, SESSION_READ_TIMEOUT_SECS,
};
use crate::download::progress::TransferProgress;
use crate::download::verify::VerifyPolicy;
use crate::user_agent::ALTERNATE_BROWSER_USER_AGENT;

/// Cookie-session strategy.
///
/// The cookie jar lives as long as the strategy, so cookies picked up on one
/// file carry over to the next file of a batch.
#[derive(Debug, Clone)]
pub struct SessionStrategy {
    client: Client,
    jar: Arc<Jar>,
    token: Option<String>,
    show_progress: bool,
}

impl SessionStrategy {
    /// Builds the session client.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn new(config: &GofileConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let jar = Arc::new(Jar::default());
        let client = base_client_builder(SESSION_CONNECT_TIMEOUT_SECS, SESSION_READ_TIMEOUT_SECS)
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::none())
            .user_agent(ALTERNATE_BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| DownloadError::client_build(StrategyKind::Session.name(), e))?;

        Ok(Self {
            client,
            jar,
            token: config.token.clone(),
            show_progress: config.show_progress,
        })
    }

    /// Follows redirects hop by hop until a non-redirect response arrives.
    async fn follow(&self, start: &str) -> Result<reqwest::Response, DownloadError> {
        let mut current =
            Url::parse(start).map_err(|_| DownloadError::invalid_url(start.to_string()))?;

        for hop in 0..=MAX_SESSION_REDIRECTS {
            if let Some(token) = &self.token {
                self.jar.add_cookie_str(&account_cookie(token), &current);
            }

            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| DownloadError::network(current.as_str(), e))?;
            let status = response.status();

            if status.is_redirection() {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|location| current.join(location).ok())
                    .ok_or_else(|| DownloadError::BadRedirect {
                        url: current.to_string(),
                        status: status.as_u16(),
                    })?;
                debug!(hop, from = %current, to = %next, "following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(DownloadError::http_status(current.as_str(), status.as_u16()));
            }
            return Ok(response);
        }

        Err(DownloadError::TooManyRedirects {
            url: start.to_string(),
            hops: MAX_SESSION_REDIRECTS + 1,
        })
    }
}

#[async_trait]
impl TransportStrategy for SessionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Session
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn attempt(&self, request: &DownloadRequest) -> Result<u64, DownloadError> {
        let response = self.follow(&request.url).await?;

        // Length only drives the progress bar here; verification ignores it.
        let total = request
            .expected_size
            .or_else(|| content_length(&response));
        let progress = TransferProgress::new(&request.display_name, total, self.show_progress);
        let streamed =
            stream_to_path(response, &request.url, &request.destination, &progress).await;
        progress.finish();
        let streamed = streamed?;

        let bytes = finish_verified(
            &request.destination,
            None,
            &streamed,
            &request.file_name(),
            VerifyPolicy::SESSION,
        )
        .await?;

        if let Some(missing) = shortfall(request.expected_size, bytes) {
            warn!(
                path = %request.destination.display(),
                expected = request.expected_size,
                actual = bytes,
                missing,
                "session download is shorter than the declared size; keeping it"
            );
        }
        Ok(bytes)
    }
}

/// Bytes missing relative to the declared size, if any.
fn shortfall(expected: Option<u64>, written: u64) -> Option<u64> {
    expected
        .and_then(|expected| expected.checked_sub(written))
        .filter(|&missing| missing > 0)
}
