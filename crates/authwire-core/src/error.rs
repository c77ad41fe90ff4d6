//! Error types for authwire.
//!
//! This module provides a unified error type with explicit variants for
//! transport, refresh, protocol, credential storage and input validation
//! errors. Every type here is `Clone` so a shared refresh outcome can be
//! handed to several waiting callers.

use std::fmt;
use thiserror::Error;

/// The unified error type for authwire operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The access token could not be refreshed; the session was torn down.
    #[error("session refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Non-success HTTP responses, for callers that opt into treating
    /// them as errors via [`Response::error_for_status`](crate::Response::error_for_status).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credential store failures.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (bad URL, bad header).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A response body could not be decoded.
    #[error("failed to decode response body: {message}")]
    Decode { message: String },
}

impl Error {
    /// Returns true if this error came out of the refresh path.
    pub fn is_refresh_failure(&self) -> bool {
        matches!(self, Error::Refresh(_))
    }

    /// Returns true if this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Reasons the refresh exchange can fail.
///
/// Any of these tears the session down: both credential slots are removed
/// and the navigator is sent to the login path.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// No refresh token was stored, so the exchange was never attempted.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The exchange request did not complete.
    #[error("refresh request failed: {0}")]
    Transport(TransportError),

    /// The refresh endpoint answered with a non-success status.
    #[error("refresh endpoint rejected the token: {0}")]
    Rejected(ProtocolError),

    /// The refresh endpoint answered 2xx but the body was unusable.
    #[error("malformed refresh response: {message}")]
    MalformedResponse { message: String },

    /// Reading or writing the credential store failed mid-refresh.
    #[error("credential store unavailable: {0}")]
    Store(StoreError),
}

/// Protocol-level errors derived from HTTP responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if the body carried one).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Credential store errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The persisted credentials could not be parsed.
    #[error("corrupt credential data: {message}")]
    Corrupt { message: String },

    /// The store is not usable (e.g. a poisoned lock).
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid header name or value.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
