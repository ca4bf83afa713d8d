use std::time::Duration;

use crate::url::DEFAULT_MODELS_BASE_URL;

/// Default bound on the wait for a response head.
pub const DEFAULT_FIRST_BYTE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on the gap between consecutive stream chunks.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport configuration for GitHub Models chat requests.
///
/// Credentials are deliberately absent: the bearer token is resolved per
/// call by the session's credential provider and passed into each request.
#[derive(Debug, Clone)]
pub struct ModelsApiConfig {
    /// Base URL for the chat-completions endpoint.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Bound on the wait for the response head; a stall becomes an error
    /// instead of hanging indefinitely.
    pub first_byte_timeout: Duration,
    /// Bound on the gap between consecutive stream chunks.
    pub idle_timeout: Duration,
}

impl Default for ModelsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODELS_BASE_URL.to_string(),
            user_agent: None,
            connect_timeout: None,
            first_byte_timeout: DEFAULT_FIRST_BYTE_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl ModelsApiConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_first_byte_timeout(mut self, timeout: Duration) -> Self {
        self.first_byte_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
