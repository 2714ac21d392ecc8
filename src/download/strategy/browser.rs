//! Browser-simulation fetch.
//!
//! Replays what a browser does before a download starts: load the site root
//! for anti-bot cookies, load the content page for per-content cookies, then
//! fetch the direct-download form of the link with a full browser header set
//! and a matching `Referer`. The API download endpoint is the second candidate.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, REFERER,
};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{DownloadRequest, StrategyKind, TransportStrategy, finish_verified};
use crate::config::GofileConfig;
use crate::download::DownloadError;
use crate::download::client::{
    account_cookie, base_client_builder, content_length, send_checked, stream_to_path,
};
use crate::download::constants::{BROWSER_CONNECT_TIMEOUT_SECS, BROWSER_READ_TIMEOUT_SECS};
use crate::download::progress::TransferProgress;
use crate::download::verify::VerifyPolicy;
use crate::resolver::{ContentId, share_token};
use crate::user_agent::BROWSER_USER_AGENT;

/// Most elaborate strategy; builds a fresh cookie session for every attempt.
#[derive(Debug, Clone)]
pub struct BrowserStrategy {
    api_base_url: String,
    website_base_url: String,
    token: Option<String>,
    show_progress: bool,
}

impl BrowserStrategy {
    /// Creates the strategy; clients are built per attempt.
    #[must_use]
    pub fn new(config: &GofileConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            website_base_url: config.website_base_url.clone(),
            token: config.token.clone(),
            show_progress: config.show_progress,
        }
    }

    fn build_session(&self) -> Result<(Client, Arc<Jar>), DownloadError> {
        let jar = Arc::new(Jar::default());
        let client = base_client_builder(BROWSER_CONNECT_TIMEOUT_SECS, BROWSER_READ_TIMEOUT_SECS)
            .cookie_provider(Arc::clone(&jar))
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers())
            .build()
            .map_err(|e| DownloadError::client_build(StrategyKind::Browser.name(), e))?;
        Ok((client, jar))
    }

    /// Download URLs to try, in order, without duplicates.
    fn candidates(&self, request: &DownloadRequest) -> Vec<String> {
        let mut candidates = vec![direct_download_url(&request.url)];

        let content_id = request
            .content_id
            .clone()
            .or_else(|| share_token(&request.url));
        if let Some(id) = content_id {
            let api_url = api_download_url(&self.api_base_url, &id, self.token.as_deref());
            if !candidates.contains(&api_url) {
                candidates.push(api_url);
            }
        }
        candidates
    }

    async fn fetch_candidate(
        &self,
        client: &Client,
        url: &str,
        referer: &str,
        request: &DownloadRequest,
    ) -> Result<u64, DownloadError> {
        let response = send_checked(client.get(url).header(REFERER, referer), url).await?;

        let expected = request
            .expected_size
            .or_else(|| content_length(&response));
        let progress = TransferProgress::new(&request.display_name, expected, self.show_progress);
        let streamed = stream_to_path(response, url, &request.destination, &progress).await;
        progress.finish();
        let streamed = streamed?;

        finish_verified(
            &request.destination,
            expected,
            &streamed,
            &request.file_name(),
            VerifyPolicy::BROWSER,
        )
        .await
    }
}

#[async_trait]
impl TransportStrategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn attempt(&self, request: &DownloadRequest) -> Result<u64, DownloadError> {
        let (client, jar) = self.build_session()?;

        let root = format!("{}/", self.website_base_url);
        if let Some(token) = &self.token
            && let Ok(root_url) = Url::parse(&root)
        {
            jar.add_cookie_str(&account_cookie(token), &root_url);
        }
        warm_up(&client, &root).await;

        let page_id = request
            .page_id
            .clone()
            .or_else(|| share_token(&request.url))
            .or_else(|| request.content_id.clone());
        let referer = match &page_id {
            Some(id) => {
                let page = format!("{}/d/{}", self.website_base_url, id);
                warm_up(&client, &page).await;
                page
            }
            None => root,
        };

        let mut last_error = None;
        for candidate in self.candidates(request) {
            if let Some(token) = &self.token
                && let Ok(candidate_url) = Url::parse(&candidate)
            {
                jar.add_cookie_str(&account_cookie(token), &candidate_url);
            }

            match self
                .fetch_candidate(&client, &candidate, &referer, request)
                .await
            {
                Ok(bytes) => return Ok(bytes),
                Err(error) => {
                    warn!(url = %candidate, error = %error, "browser download candidate failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DownloadError::invalid_url(request.url.clone())))
    }
}

/// Loads `url` to collect cookies; failures only get logged.
async fn warm_up(client: &Client, url: &str) {
    match client.get(url).send().await {
        Ok(response) => debug!(url, status = response.status().as_u16(), "visited page"),
        Err(error) => debug!(url, error = %error, "page visit failed"),
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("same-origin"));
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers
}

/// Rewrites a content-page link (`.../d/{id}`) to its download form
/// (`.../download/{id}`). Other links are returned unchanged.
#[must_use]
pub fn direct_download_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(segments) = parsed.path_segments() else {
        return url.to_string();
    };
    let mut segments: Vec<String> = segments.map(str::to_string).collect();

    let Some(index) = segments
        .iter()
        .enumerate()
        .position(|(i, segment)| segment == "d" && i + 1 < segments.len())
    else {
        return url.to_string();
    };
    segments[index] = "download".to_string();
    parsed.set_path(&format!("/{}", segments.join("/")));
    parsed.to_string()
}

/// API-level download URL for `id`, with the token as a query parameter.
#[must_use]
pub fn api_download_url(api_base_url: &str, id: &ContentId, token: Option<&str>) -> String {
    let base = format!(
        "{}/contents/{}/download",
        api_base_url.trim_end_matches('/'),
        urlencoding::encode(id.as_str())
    );
    match token {
        Some(token) => format!("{base}?token={}", urlencoding::encode(token)),
        None => base,
    }
}
