/// Default API base URL for local development.
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL; endpoint paths are appended verbatim.
    pub api_url: String,
    /// Bearer credential attached to every request except login.
    /// Acquired and stored outside this crate.
    pub token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `BANANA_API_URL`       | `http://localhost:8000/api` |
    /// | `BANANA_API_TOKEN`     | unset                       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Self {
        let api_url = std::env::var("BANANA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let token = std::env::var("BANANA_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_url,
            token,
            request_timeout_secs,
        }
    }
}
