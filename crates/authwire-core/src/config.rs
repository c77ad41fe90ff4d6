//! Client configuration.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::types::BaseUrl;

/// Default path of the token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/refresh";

/// Default path the navigator is sent to when the session is torn down.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default status code that signals an expired access token.
pub const DEFAULT_EXPIRED_STATUS: u16 = 401;

/// How concurrent expiries share the refresh exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Every expired request runs its own exchange. Concurrent refreshes
    /// race and the last store write wins.
    #[default]
    Independent,
    /// At most one exchange is in flight; requests that expire meanwhile
    /// wait for it and share its outcome.
    SingleFlight,
}

/// Configuration for a [`Client`](crate::Client).
///
/// # Example
///
/// ```
/// use authwire_core::{BaseUrl, ClientConfig, RefreshPolicy};
///
/// let config = ClientConfig::new(BaseUrl::new("https://api.example.com").unwrap())
///     .with_login_path("/signin")
///     .with_policy(RefreshPolicy::SingleFlight);
///
/// assert_eq!(config.refresh_url().unwrap().as_str(), "https://api.example.com/api/refresh");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL request paths and the refresh path are resolved against.
    pub base_url: BaseUrl,

    /// Path (or absolute URL) of the refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Path handed to the navigator on teardown.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Status code that marks a response as authorization-expired.
    #[serde(default = "default_expired_status")]
    pub expired_status: u16,

    /// Refresh sharing policy.
    #[serde(default)]
    pub policy: RefreshPolicy,
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_expired_status() -> u16 {
    DEFAULT_EXPIRED_STATUS
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            expired_status: DEFAULT_EXPIRED_STATUS,
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_expired_status(mut self, status: StatusCode) -> Self {
        self.expired_status = status.as_u16();
        self
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The fully resolved refresh endpoint.
    pub fn refresh_url(&self) -> Result<Url, Error> {
        self.base_url.join(&self.refresh_path)
    }

    /// Whether `status` signals an expired access token.
    pub fn is_expired(&self, status: StatusCode) -> bool {
        status.as_u16() == self.expired_status
    }
}
