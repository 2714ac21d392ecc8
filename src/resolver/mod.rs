//! Content identifier resolution.
//!
//! Turns user input (a bare content code or a share URL such as
//! `https://gofile.io/d/AbC123`) into a canonical [`ContentId`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

/// Share URL pattern: `<scheme>://[www.]<host>/d/<token>` with optional
/// trailing slash, query or fragment.
#[allow(clippy::expect_used)]
static SHARE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:www\.)?[^/\s?#]+/d/([A-Za-z0-9_\-]+)/?(?:[?#]\S*)?$")
        .expect("share URL regex is valid") // Static pattern, safe to panic
});

/// Opaque token naming a remote file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    /// Wraps a raw string as an identifier without validation.
    ///
    /// Used when [`resolve`] cannot extract a token and the caller retries the
    /// input as a literal identifier.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves a bare token or share URL to a [`ContentId`].
///
/// - Input without `/` and `.` is already a bare identifier and is returned unchanged.
/// - Share URLs yield the token after `/d/`.
/// - Anything else yields `None`.
///
/// # Examples
///
/// ```
/// use gofile_core::resolver::resolve;
///
/// assert_eq!(resolve("abc123").unwrap().as_str(), "abc123");
/// assert_eq!(resolve("https://gofile.io/d/abc123").unwrap().as_str(), "abc123");
/// assert!(resolve("https://gofile.io/about").is_none());
/// ```
#[must_use]
#[tracing::instrument(level = "debug")]
pub fn resolve(raw: &str) -> Option<ContentId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed.contains('/') && !trimmed.contains('.') {
        trace!("input is a bare identifier");
        return Some(ContentId::from_raw(trimmed));
    }

    let token = share_token(trimmed);
    match &token {
        Some(id) => debug!(id = %id, "extracted identifier from share URL"),
        None => debug!("input does not match the share URL pattern"),
    }
    token
}

/// Extracts the `/d/<token>` part of a share URL, if the URL has that shape.
#[must_use]
pub fn share_token(url: &str) -> Option<ContentId> {
    SHARE_URL_PATTERN
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| ContentId::from_raw(m.as_str()))
}
