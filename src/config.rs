//! Runtime configuration shared by the metadata client and download strategies.

/// Public Gofile API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.gofile.io";

/// Public Gofile website base URL (root page and `/d/{id}` content pages).
pub const DEFAULT_WEBSITE_BASE_URL: &str = "https://gofile.io";

/// Opaque `wt` constant the content API requires on every metadata query.
pub const DEFAULT_WEBSITE_TOKEN: &str = "4fd6sg89d7s6";

/// Configuration for [`ApiClient`](crate::api::ApiClient) and the transport strategies.
///
/// Defaults target the public service; the `with_*` setters let callers point
/// at mirrors or mock servers.
#[derive(Clone)]
pub struct GofileConfig {
    /// Base URL of the content API, without trailing slash.
    pub api_base_url: String,
    /// Base URL of the human-facing website, without trailing slash.
    pub website_base_url: String,
    /// API-mandated `wt` query parameter.
    pub website_token: String,
    /// Account token sent as bearer header and `accountToken` cookie.
    pub token: Option<String>,
    /// Whether transfers draw a progress bar.
    pub show_progress: bool,
}

impl Default for GofileConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            website_base_url: DEFAULT_WEBSITE_BASE_URL.to_string(),
            website_token: DEFAULT_WEBSITE_TOKEN.to_string(),
            token: None,
            show_progress: true,
        }
    }
}

impl GofileConfig {
    /// Creates a configuration targeting the public service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = trim_base(url.into());
        self
    }

    /// Overrides the website base URL.
    #[must_use]
    pub fn with_website_base_url(mut self, url: impl Into<String>) -> Self {
        self.website_base_url = trim_base(url.into());
        self
    }

    /// Sets the account token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    /// Enables or disables progress bars.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

impl std::fmt::Debug for GofileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GofileConfig")
            .field("api_base_url", &self.api_base_url)
            .field("website_base_url", &self.website_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("show_progress", &self.show_progress)
            .finish_non_exhaustive()
    }
}
