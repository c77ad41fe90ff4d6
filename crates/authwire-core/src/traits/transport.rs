//! Transport trait.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{Request, Response};

/// Performs a single HTTP exchange.
///
/// Any HTTP status, including 4xx and 5xx, is a successful exchange and
/// comes back as `Ok`. `Err` is reserved for failures where no response
/// was received at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and buffer the full response.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}
