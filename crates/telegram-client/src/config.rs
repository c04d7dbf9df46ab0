//! Configuration types for telegram-client.

use std::time::Duration;

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Configuration for talking to the Telegram Bot API.
#[derive(Clone)]
pub struct BotConfig {
    /// Base URL of the Bot API (e.g., "https://api.telegram.org").
    pub api_url: String,
    /// Bot token issued by BotFather.
    pub token: String,
    /// Server-side long-poll timeout for getUpdates.
    pub poll_timeout: Duration,
}

impl BotConfig {
    /// Create a new configuration for the public Bot API.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Point the client at a different Bot API server (e.g. a local one).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the long-poll timeout.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Get the URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}
