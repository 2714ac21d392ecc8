//! Error types for the metadata API client.

use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient) operations.
///
/// Any of these is terminal for the current operation; the client never retries.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The response envelope carried a status other than `"ok"`.
    #[error("API returned status '{status}' for {content_id}: {message}")]
    Status {
        /// The content id that was queried (or `accounts` for guest creation).
        content_id: String,
        /// The envelope status string (e.g. `error-notFound`).
        status: String,
        /// Server-supplied message, or the status when none was given.
        message: String,
    },

    /// The data node declared a content type this client does not know.
    #[error("unknown content type '{kind}' for {content_id}")]
    UnknownContentType {
        /// The content id whose node carried the type.
        content_id: String,
        /// The unrecognized `type` value.
        kind: String,
    },

    /// The response was valid JSON but not the expected shape.
    #[error("malformed API response for {content_id}: {reason}")]
    Malformed {
        /// The content id that was queried.
        content_id: String,
        /// What was missing or wrong.
        reason: String,
    },

    /// Network-level failure (DNS, connect, TLS, body read).
    #[error("network error querying {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out.
    #[error("timeout querying {url}")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// Non-success HTTP status without a decodable API envelope.
    #[error("HTTP {status} querying {url}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A base URL could not be combined into a request URL.
    #[error("invalid API URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build API HTTP client: {source}")]
    ClientBuild {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Creates a non-ok envelope status error.
    pub fn status(
        content_id: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Status {
            content_id: content_id.into(),
            status: status.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown content type error.
    pub fn unknown_content_type(content_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownContentType {
            content_id: content_id.into(),
            kind: kind.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(content_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            content_id: content_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a network or timeout error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true when the server answered but refused the request
    /// (as opposed to a transport failure).
    #[must_use]
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::HttpStatus { .. })
    }
}
