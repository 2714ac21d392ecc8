//! Constants for the download module (timeouts, chunking, verification thresholds).

/// Size of the write buffer flushed to disk per chunk.
pub const CHUNK_SIZE: usize = 8192;

/// Direct strategy connect timeout.
pub const DIRECT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Direct strategy read timeout (idle time between body reads).
pub const DIRECT_READ_TIMEOUT_SECS: u64 = 30;

/// HEAD probe timeout for the direct strategy.
pub const HEAD_TIMEOUT_SECS: u64 = 10;

/// Low-level strategy connect timeout.
pub const LOW_LEVEL_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Low-level strategy read timeout.
pub const LOW_LEVEL_READ_TIMEOUT_SECS: u64 = 30;

/// Session strategy connect timeout.
pub const SESSION_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Session strategy read timeout.
pub const SESSION_READ_TIMEOUT_SECS: u64 = 30;

/// Browser-simulation strategy connect timeout.
pub const BROWSER_CONNECT_TIMEOUT_SECS: u64 = 20;

/// Browser-simulation strategy read timeout.
pub const BROWSER_READ_TIMEOUT_SECS: u64 = 30;

/// Maximum redirect hops the session strategy follows.
pub const MAX_SESSION_REDIRECTS: usize = 10;

/// Files at or above this size are never treated as disguised error pages.
pub const HTML_SNIFF_THRESHOLD_BYTES: u64 = 100 * 1024;

/// Number of leading bytes kept for signature inspection.
pub const SIGNATURE_SNIFF_LEN: usize = 512;

/// Name of the cookie carrying the account token on download links.
pub const ACCOUNT_TOKEN_COOKIE: &str = "accountToken";
