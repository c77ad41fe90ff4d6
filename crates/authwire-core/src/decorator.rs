//! Attaches the stored access token to outgoing requests.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::traits::CredentialStore;
use crate::types::Request;

/// Pre-dispatch step: reads the access slot and, if it holds a token, sets
/// `Authorization: Bearer <token>` on a copy of the request.
///
/// Decoration never fails. A missing token, an unreadable store or a token
/// that cannot be encoded as a header all send the request as it was built;
/// rejecting it is the server's job.
#[derive(Clone)]
pub struct RequestDecorator {
    store: Arc<dyn CredentialStore>,
}

impl RequestDecorator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Return the request as it should be dispatched right now.
    pub async fn decorate(&self, request: &Request) -> Request {
        let token = match self.store.access_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                trace!("no access token stored, sending request as built");
                return request.clone();
            }
            Err(e) => {
                warn!(error = %e, "failed to read access token, sending request as built");
                return request.clone();
            }
        };

        match token.bearer_header() {
            Ok(value) => request.with_authorization(value),
            Err(e) => {
                warn!(error = %e, "stored access token is not a valid header value");
                request.clone()
            }
        }
    }
}

impl std::fmt::Debug for RequestDecorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDecorator").finish_non_exhaustive()
    }
}
