//! Connection settings shared by the HTTP collaborators.

use std::time::Duration;

use thiserror::Error;

/// Default user agent for collaborator requests.
pub const DEFAULT_USER_AGENT: &str = "healthroute/0.1";

/// Header carrying the correlation identifier on every call.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Default transport timeout in seconds.
///
/// The planner wraps each call in its own, shorter budget; this bound only
/// stops a stalled connection from outliving the request.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error raised when an HTTP collaborator cannot be constructed.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The base URL does not parse or cannot carry a path.
    #[error("invalid base URL {base_url:?}: {message}")]
    InvalidBaseUrl {
        /// Rejected URL.
        base_url: String,
        /// Parser message.
        message: String,
    },
}

/// Configuration for an HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Base URL of the service (e.g., `"http://localhost:8002"`).
    pub base_url: String,
    /// Transport timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpClientConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
