//! Token types for bearer authentication.

use std::fmt;

use http::HeaderValue;

use crate::error::InvalidInputError;

/// An access token for authenticated requests.
///
/// Access tokens are short-lived and sent as `Authorization: Bearer <token>`.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    ///
    /// # Security
    ///
    /// Use only when handing the token to a credential store.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the `Authorization` header value for this token.
    ///
    /// The value is marked sensitive so `http` redacts it from Debug output.
    pub fn bearer_header(&self) -> Result<HeaderValue, InvalidInputError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|e| {
            InvalidInputError::Header {
                name: "authorization".to_string(),
                reason: e.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// Refresh tokens are longer-lived and only ever sent to the refresh
/// endpoint.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}
