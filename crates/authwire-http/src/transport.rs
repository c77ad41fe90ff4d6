//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use authwire_core::{Request, Response, Transport, TransportError};

/// A [`Transport`] over a shared `reqwest::Client`.
///
/// Every status code is returned as a [`Response`]; only failures to get a
/// response at all become a [`TransportError`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            user_agent: concat!("authwire/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

impl ReqwestTransportBuilder {
    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Per-request timeout, applied to the refresh exchange as well.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| TransportError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(ReqwestTransport {
            client,
            timeout: self.timeout,
        })
    }
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            match self.timeout {
                Some(timeout) => TransportError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                // Timeout configured on a client passed to `from_client`; duration unknown.
                None => TransportError::Http {
                    message: format!("request timed out: {}", err),
                },
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let (method, url, headers, body) = request.into_parts();
        debug!("HTTP request");

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;
        trace!(status = %status, bytes = body.len(), "HTTP response");

        Ok(Response::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        let transport = ReqwestTransport::builder()
            .user_agent("authwire-test")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(transport.timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind and drop a listener to get a port nothing is listening on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/orders", port).parse().unwrap();

        let err = ReqwestTransport::new()
            .unwrap()
            .send(Request::get(url))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connection { .. }));
    }
}
