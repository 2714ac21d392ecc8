//! Post-write integrity verification.
//!
//! Two checks: declared size versus bytes on disk, and HTML signature sniffing
//! to catch an error page served in place of an image. Each strategy picks a
//! [`VerifyPolicy`] that enables the checks it trusts.

use std::fmt;
use std::path::Path;

use super::DownloadError;
use super::constants::HTML_SNIFF_THRESHOLD_BYTES;
use super::filename::extension_of;

/// Extensions treated as binary image content for signature sniffing.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "ico", "heic", "avif",
];

/// Leading markers of an HTML document.
const HTML_SIGNATURES: &[&[u8]] = &[b"<!doctype html", b"<html", b"<head", b"<body"];

/// Which checks a strategy applies after writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    /// Fail when a known, nonzero expected size exceeds the bytes written.
    pub check_size: bool,
    /// Fail when nothing was written.
    pub require_bytes: bool,
    /// Fail when a small image file starts with an HTML signature.
    pub sniff_disguised_html: bool,
}

impl VerifyPolicy {
    /// Direct and low-level strategies: declared size is authoritative.
    pub const STREAMING: Self = Self {
        check_size: true,
        require_bytes: false,
        sniff_disguised_html: false,
    };

    /// Session strategy: content length is unreliable, any bytes count.
    pub const SESSION: Self = Self {
        check_size: false,
        require_bytes: true,
        sniff_disguised_html: false,
    };

    /// Browser-simulation strategy: every check.
    pub const BROWSER: Self = Self {
        check_size: true,
        require_bytes: true,
        sniff_disguised_html: true,
    };
}

/// Result of [`verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// All enabled checks passed.
    Pass,
    /// Fewer bytes than expected.
    Truncated {
        /// Expected size.
        expected: u64,
        /// Bytes written.
        actual: u64,
    },
    /// Nothing was written.
    Empty,
    /// An HTML page was written where an image was expected.
    DisguisedErrorPage {
        /// Bytes written.
        actual: u64,
    },
}

impl Verdict {
    /// Returns true for [`Verdict::Pass`].
    #[must_use]
    pub fn passed(self) -> bool {
        self == Self::Pass
    }

    /// Converts a failing verdict into the matching [`DownloadError`].
    ///
    /// # Errors
    ///
    /// Returns the integrity error for any verdict other than `Pass`.
    pub fn into_result(self, path: &Path) -> Result<(), DownloadError> {
        match self {
            Self::Pass => Ok(()),
            Self::Truncated { expected, actual } => {
                Err(DownloadError::truncated(path, expected, actual))
            }
            Self::Empty => Err(DownloadError::EmptyBody {
                path: path.to_path_buf(),
            }),
            Self::DisguisedErrorPage { actual } => Err(DownloadError::DisguisedErrorPage {
                path: path.to_path_buf(),
                bytes: actual,
            }),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("verified"),
            Self::Truncated { expected, actual } => {
                write!(f, "truncated transfer: expected {expected} bytes, got {actual}")
            }
            Self::Empty => f.write_str("no bytes written"),
            Self::DisguisedErrorPage { actual } => {
                write!(f, "HTML error page ({actual} bytes) in place of image content")
            }
        }
    }
}

/// Verifies a written file.
///
/// `head` holds the first bytes of the file; `filename` is the destination
/// name whose extension decides whether signature sniffing applies.
#[must_use]
pub fn verify(
    expected: Option<u64>,
    actual: u64,
    head: &[u8],
    filename: &str,
    policy: VerifyPolicy,
) -> Verdict {
    if policy.require_bytes && actual == 0 {
        return Verdict::Empty;
    }

    if policy.check_size
        && let Some(expected) = expected.filter(|&e| e > 0)
        && actual < expected
    {
        return Verdict::Truncated { expected, actual };
    }

    if policy.sniff_disguised_html
        && actual < HTML_SNIFF_THRESHOLD_BYTES
        && is_image_filename(filename)
        && looks_like_html(head)
    {
        return Verdict::DisguisedErrorPage { actual };
    }

    Verdict::Pass
}

/// Returns true when the filename's extension names image content.
#[must_use]
pub fn is_image_filename(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns true when `head` starts (after whitespace or a BOM) with an HTML marker.
#[must_use]
pub fn looks_like_html(head: &[u8]) -> bool {
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let trimmed = &head[start..];

    HTML_SIGNATURES.iter().any(|signature| {
        trimmed.len() >= signature.len()
            && trimmed[..signature.len()].eq_ignore_ascii_case(signature)
    })
}
