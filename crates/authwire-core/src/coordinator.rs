//! Refresh-and-retry state machine.
//!
//! Every response that comes back from the transport is classified:
//!
//! - not expired: passed to the caller untouched;
//! - expired on a request that was already replayed: passed to the caller
//!   untouched, so the cycle always terminates;
//! - expired on a first attempt: the refresh token is exchanged for a new
//!   access token and the request is replayed once.
//!
//! Any failure of the exchange removes both credential slots, sends the
//! navigator to the login path and surfaces the refresh failure.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{ClientConfig, RefreshPolicy};
use crate::error::{Error, RefreshError};
use crate::traits::{CredentialStore, Navigator, Transport};
use crate::types::{Request, Response, Slot};
use crate::AccessToken;

/// A logical call is replayed at most this many times.
pub const MAX_REPLAYS: u32 = 1;

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not an expiry; hand it to the caller.
    Pass,
    /// Expired on a first attempt; refresh and replay.
    ExpiredFirst,
    /// Expired on a replay; hand it to the caller.
    ExpiredRetried,
}

/// Body returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

type RefreshFuture = BoxFuture<'static, Result<AccessToken, RefreshError>>;

/// Post-dispatch step of the [`Client`](crate::Client) pipeline.
pub struct RefreshCoordinator {
    exchange: Arc<Exchange>,
    config: ClientConfig,
    // Weak so an exchange abandoned by every waiter is dropped, not resumed.
    pending: Mutex<Option<WeakShared<RefreshFuture>>>,
}

/// Everything the refresh exchange and teardown need, owned so an exchange
/// can outlive the caller that started it when it is shared.
struct Exchange {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresh_url: Url,
    login_path: String,
}

impl RefreshCoordinator {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        Ok(Self {
            exchange: Arc::new(Exchange {
                transport,
                store,
                navigator,
                refresh_url: config.refresh_url()?,
                login_path: config.login_path.clone(),
            }),
            config: config.clone(),
            pending: Mutex::new(None),
        })
    }

    /// Classify a response given how many times its request was replayed.
    pub fn classify(&self, response: &Response, replays: u32) -> Disposition {
        if !self.config.is_expired(response.status()) {
            Disposition::Pass
        } else if replays >= MAX_REPLAYS {
            Disposition::ExpiredRetried
        } else {
            Disposition::ExpiredFirst
        }
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// On failure the session has already been torn down when this returns.
    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        match self.config.policy {
            RefreshPolicy::Independent => self.exchange.clone().run().await,
            RefreshPolicy::SingleFlight => self.refresh_shared().await,
        }
    }

    async fn refresh_shared(&self) -> Result<AccessToken, RefreshError> {
        let pending = {
            let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref().and_then(WeakShared::upgrade) {
                Some(pending) => {
                    debug!("Joining in-flight refresh");
                    pending
                }
                None => {
                    let pending: Shared<RefreshFuture> =
                        self.exchange.clone().run().boxed().shared();
                    *slot = pending.downgrade();
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let current = slot.as_ref().and_then(WeakShared::upgrade);
        if current.is_none_or(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }

        outcome
    }
}

impl Exchange {
    #[instrument(skip(self), fields(url = %self.refresh_url))]
    async fn run(self: Arc<Self>) -> Result<AccessToken, RefreshError> {
        match self.exchange().await {
            Ok(token) => {
                info!("Access token refreshed");
                Ok(token)
            }
            Err(e) => {
                self.teardown(&e).await;
                Err(e)
            }
        }
    }

    async fn exchange(&self) -> Result<AccessToken, RefreshError> {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .map_err(RefreshError::Store)?
            .ok_or(RefreshError::MissingRefreshToken)?;

        // Straight to the transport: the exchange is never decorated and
        // never inspected for expiry.
        let body = json!({ "refresh_token": refresh_token.as_str() }).to_string();
        let request = Request::post(self.refresh_url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(RefreshError::Transport)?;

        if !response.is_success() {
            return Err(RefreshError::Rejected(response.to_protocol_error()));
        }

        let body: RefreshResponse = serde_json::from_slice(response.bytes()).map_err(|e| {
            RefreshError::MalformedResponse {
                message: e.to_string(),
            }
        })?;

        if body.access_token.is_empty() {
            return Err(RefreshError::MalformedResponse {
                message: "empty access_token".to_string(),
            });
        }

        self.store
            .set(Slot::Access, &body.access_token)
            .await
            .map_err(RefreshError::Store)?;

        if let Some(rotated) = body.refresh_token.filter(|t| !t.is_empty()) {
            debug!("Refresh token rotated");
            self.store
                .set(Slot::Refresh, &rotated)
                .await
                .map_err(RefreshError::Store)?;
        }

        Ok(AccessToken::new(body.access_token))
    }

    async fn teardown(&self, cause: &RefreshError) {
        warn!(error = %cause, "Refresh failed, ending session");

        for slot in Slot::ALL {
            if let Err(e) = self.store.remove(slot).await {
                warn!(%slot, error = %e, "Failed to clear credential slot");
            }
        }

        info!(path = %self.login_path, "Redirecting to login");
        self.navigator.go_to(&self.login_path);
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_url", &self.exchange.refresh_url.as_str())
            .field("login_path", &self.exchange.login_path)
            .field("expired_status", &self.config.expired_status)
            .field("policy", &self.config.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::types::BaseUrl;
    use crate::MemoryCredentialStore;
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: Request) -> Result<Response, TransportError> {
            Err(TransportError::Connection {
                message: "refused".to_string(),
            })
        }
    }

    fn coordinator(
        store: Arc<MemoryCredentialStore>,
        visits: Arc<AtomicUsize>,
    ) -> RefreshCoordinator {
        let config = ClientConfig::new(BaseUrl::new("https://api.example.com").unwrap());
        let navigator = move |_path: &str| {
            visits.fetch_add(1, Ordering::SeqCst);
        };
        RefreshCoordinator::new(&config, Arc::new(Unreachable), store, Arc::new(navigator))
            .unwrap()
    }

    fn response(status: u16) -> Response {
        Response::new(StatusCode::from_u16(status).unwrap(), HeaderMap::new(), "")
    }

    #[test]
    fn classifies_by_status_and_replay_count() {
        let c = coordinator(Arc::new(MemoryCredentialStore::new()), Arc::default());

        assert_eq!(c.classify(&response(200), 0), Disposition::Pass);
        assert_eq!(c.classify(&response(500), 0), Disposition::Pass);
        assert_eq!(c.classify(&response(403), 0), Disposition::Pass);
        assert_eq!(c.classify(&response(401), 0), Disposition::ExpiredFirst);
        assert_eq!(c.classify(&response(401), 1), Disposition::ExpiredRetried);
    }

    #[tokio::test]
    async fn exchange_transport_failure_tears_down() {
        let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
        let visits = Arc::new(AtomicUsize::new(0));
        let c = coordinator(store.clone(), visits.clone());

        let err = c.refresh().await.unwrap_err();

        assert!(matches!(err, RefreshError::Transport(_)));
        assert!(store.peek(Slot::Access).is_none());
        assert!(store.peek(Slot::Refresh).is_none());
        assert_eq!(visits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_refresh_token_tears_down() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(Slot::Access, "a1").await.unwrap();
        let visits = Arc::new(AtomicUsize::new(0));
        let c = coordinator(store.clone(), visits.clone());

        let err = c.refresh().await.unwrap_err();

        assert!(matches!(err, RefreshError::MissingRefreshToken));
        assert!(store.peek(Slot::Access).is_none());
        assert_eq!(visits.load(Ordering::SeqCst), 1);
    }
}
