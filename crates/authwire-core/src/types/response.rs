//! Response descriptor.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, ProtocolError};

/// A completed HTTP response, body fully buffered.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// Common JSON error body shape (`{"error": .., "message": ..}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl Response {
    /// Create a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A response with the given status and no headers or body.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    }

    /// Turn a non-success status into a [`ProtocolError`].
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Protocol(self.to_protocol_error()))
        }
    }

    /// Describe this response as a [`ProtocolError`], whatever its status.
    ///
    /// JSON bodies of the form `{"error", "message"}` are picked apart;
    /// any other non-empty body becomes the message verbatim.
    pub fn to_protocol_error(&self) -> ProtocolError {
        let status = self.status.as_u16();

        match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => ProtocolError::new(status, body.error, body.message),
            Err(_) => {
                let text = self.text();
                let message = (!text.trim().is_empty()).then(|| text.trim().to_string());
                ProtocolError::new(status, None, message)
            }
        }
    }
}
