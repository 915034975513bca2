//! Client configuration loaded from environment variables.

use dotenvy::dotenv;
use std::env;

/// Default API base address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment variable that overrides the API base address.
pub const BASE_URL_ENV: &str = "JOBPING_API_URL";

/// Where the client sends its requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    /// Build a config against an explicit base address. Trailing slashes are
    /// trimmed so paths can always be joined with a leading `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Load configuration from the environment, reading `.env` if present.
    /// Falls back to [`DEFAULT_BASE_URL`] when `JOBPING_API_URL` is unset.
    pub fn from_env() -> Self {
        let _ = dotenv();

        match env::var(BASE_URL_ENV) {
            Ok(url) => Self::new(url),
            Err(_) => Self::new(DEFAULT_BASE_URL),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
