//! Metadata client for the Gofile content API.
//!
//! [`ApiClient::fetch`] turns a [`ContentId`] into a typed [`ContentDescriptor`]:
//! a file, a folder tree, or the [`ContentDescriptor::PasswordRequired`] sentinel.
//!
//! # Example
//!
//! ```no_run
//! use gofile_core::api::{ApiClient, Credentials};
//! use gofile_core::{ContentId, GofileConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&GofileConfig::default())?;
//! let descriptor = client
//!     .fetch(&ContentId::from_raw("abc123"), &Credentials::default())
//!     .await?;
//! println!("{descriptor:?}");
//! # Ok(())
//! # }
//! ```

mod descriptor;
mod error;

pub use descriptor::{ContentDescriptor, FileDescriptor, FolderDescriptor};
pub use error::ApiError;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::GofileConfig;
use crate::resolver::ContentId;
use crate::user_agent;

use descriptor::{ApiEnvelope, parse_content_envelope};

const API_CONNECT_TIMEOUT_SECS: u64 = 10;
const API_READ_TIMEOUT_SECS: u64 = 30;

/// Credentials for a metadata query.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Account token sent as `Authorization: Bearer`.
    pub bearer_token: Option<String>,
    /// Plain-text content password; only its SHA-256 digest is transmitted.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials from optional token and password.
    #[must_use]
    pub fn new(bearer_token: Option<String>, password: Option<String>) -> Self {
        Self {
            bearer_token,
            password,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Returns the lowercase hex SHA-256 digest the API expects for content passwords.
#[must_use]
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// `data` node of the guest account response.
#[derive(Debug, Deserialize)]
struct AccountData {
    token: Option<String>,
}

/// HTTP client for content metadata queries.
pub struct ApiClient {
    client: Client,
    base_url: String,
    website_token: String,
}

impl ApiClient {
    /// Creates a client for the API configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &GofileConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(API_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(API_READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_api_user_agent())
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            website_token: config.website_token.clone(),
        })
    }

    /// Fetches the descriptor for `id`.
    ///
    /// The password, when given, is hashed before it leaves the process.
    /// A gated node whose password status is not `passwordOk` comes back as
    /// [`ContentDescriptor::PasswordRequired`], not as an error.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] when the envelope status is not `"ok"`
    /// - [`ApiError::UnknownContentType`] / [`ApiError::Malformed`] for unexpected shapes
    /// - transport variants for network, timeout and HTTP failures
    #[instrument(skip(self, credentials), fields(id = %id))]
    pub async fn fetch(
        &self,
        id: &ContentId,
        credentials: &Credentials,
    ) -> Result<ContentDescriptor, ApiError> {
        let url = self.contents_url(id, credentials.password.as_deref())?;
        debug!(url = %redact_password(&url), "querying content metadata");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &credentials.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let envelope = self.send_for_envelope(request, &redact_password(&url)).await?;
        let descriptor = parse_content_envelope(id, envelope)?;

        match &descriptor {
            ContentDescriptor::File(file) => debug!(name = ?file.name, size = ?file.size, "file metadata received"),
            ContentDescriptor::Folder(folder) => debug!(children = folder.children.len(), "folder metadata received"),
            ContentDescriptor::PasswordRequired { status, .. } => warn!(status = ?status, "content is password protected"),
        }
        Ok(descriptor)
    }

    /// Creates a guest account and returns its token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the response carries no token.
    #[instrument(skip(self))]
    pub async fn create_guest_account(&self) -> Result<String, ApiError> {
        let url = format!("{}/accounts", self.base_url);
        let envelope = self.send_for_envelope(self.client.post(&url), &url).await?;
        envelope.ensure_ok("accounts")?;

        let data = envelope
            .data
            .ok_or_else(|| ApiError::malformed("accounts", "missing data node"))?;
        let account: AccountData = serde_json::from_value(data)
            .map_err(|e| ApiError::malformed("accounts", e.to_string()))?;
        let token = account
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::malformed("accounts", "missing account token"))?;
        debug!("guest account created");
        Ok(token)
    }

    fn contents_url(&self, id: &ContentId, password: Option<&str>) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/contents/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        );
        let mut url = Url::parse(&raw).map_err(|_| ApiError::invalid_url(raw.clone()))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("wt", &self.website_token)
                .append_pair("cache", "true")
                .append_pair("sortField", "createTime")
                .append_pair("sortDirection", "1");
            if let Some(password) = password {
                query.append_pair("password", &hash_password(password));
            }
        }
        Ok(url)
    }

    /// Sends the request and decodes the envelope.
    ///
    /// Non-2xx responses still carry an envelope on this API (e.g. 404 with
    /// `error-notFound`), so the body is decoded before the status is judged.
    async fn send_for_envelope(
        &self,
        request: reqwest::RequestBuilder,
        display_url: &str,
    ) -> Result<ApiEnvelope, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(display_url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(display_url, e))?;

        match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                Err(ApiError::http_status(display_url, status.as_u16()))
            }
            Err(e) => Err(ApiError::malformed(
                display_url,
                format!("response is not an API envelope: {e}"),
            )),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn redact_password(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "password") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "password" { "<redacted>".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
