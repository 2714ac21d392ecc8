//! Shared User-Agent strings for API and download HTTP clients.
//!
//! API traffic identifies the tool. Download strategies impersonate browsers
//! because the hosting site rejects unknown clients on its download links.

/// Chrome User-Agent used by the direct, low-level and browser-simulation strategies.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Firefox User-Agent used by the session strategy so its fingerprint differs
/// from the other strategies.
pub const ALTERNATE_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0";

/// Default User-Agent for metadata API requests (identifies the tool).
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gofile-dl/{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_user_agent_contains_crate_version() {
        let ua = default_api_user_agent();
        assert_eq!(
            ua.strip_prefix("gofile-dl/"),
            Some(env!("CARGO_PKG_VERSION")),
            "API UA must carry crate version: {ua}"
        );
    }

    #[test]
    fn test_browser_user_agents_differ() {
        assert_ne!(BROWSER_USER_AGENT, ALTERNATE_BROWSER_USER_AGENT);
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(ALTERNATE_BROWSER_USER_AGENT.contains("Firefox"));
    }
}
