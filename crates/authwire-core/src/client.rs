//! The authenticated client.

use std::sync::Arc;

use http::Method;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::coordinator::{Disposition, MAX_REPLAYS, RefreshCoordinator};
use crate::decorator::RequestDecorator;
use crate::error::{Error, InvalidInputError};
use crate::traits::{CredentialStore, Navigator, Transport};
use crate::types::{Request, Response};

/// An HTTP client that attaches the stored bearer token to every request
/// and recovers from an expired token by refreshing it and replaying the
/// request once.
///
/// The client is cheap to clone; clones share the same collaborators.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use authwire_core::{BaseUrl, Client, ClientConfig, MemoryCredentialStore, Transport};
///
/// # async fn example(transport: Arc<dyn Transport>) -> Result<(), authwire_core::Error> {
/// let config = ClientConfig::new(BaseUrl::new("https://api.example.com")?);
/// let store = Arc::new(MemoryCredentialStore::with_tokens("access", "refresh"));
/// let navigator = Arc::new(|path: &str| eprintln!("please log in at {path}"));
///
/// let client = Client::builder(transport, store, navigator)
///     .config(config)
///     .build()?;
///
/// let response = client.execute(client.get("/orders")?).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    decorator: RequestDecorator,
    coordinator: RefreshCoordinator,
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    config: Option<ClientConfig>,
}

impl ClientBuilder {
    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails if no configuration was given or the refresh URL does not resolve.
    pub fn build(self) -> Result<Client, Error> {
        let config = self.config.ok_or_else(|| InvalidInputError::Other {
            message: "client configuration is required".to_string(),
        })?;

        let coordinator = RefreshCoordinator::new(
            &config,
            self.transport.clone(),
            self.store.clone(),
            self.navigator,
        )?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                decorator: RequestDecorator::new(self.store.clone()),
                coordinator,
                transport: self.transport,
                store: self.store,
                config,
            }),
        })
    }
}

impl Client {
    /// Start building a client around its three collaborators.
    pub fn builder(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientBuilder {
        ClientBuilder {
            transport,
            store,
            navigator,
            config: None,
        }
    }

    /// Send a request through the pipeline.
    ///
    /// Any HTTP status comes back as `Ok`. An expired access token is
    /// refreshed and the request replayed once; if the refresh fails the
    /// session is torn down and the refresh failure is returned.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        self.dispatch(request, 0).await
    }

    /// Send a request that is itself a replay.
    ///
    /// The replay budget is already spent, so an expired response is
    /// returned as-is and never triggers a refresh.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn replay(&self, request: Request) -> Result<Response, Error> {
        self.dispatch(request, MAX_REPLAYS).await
    }

    async fn dispatch(&self, request: Request, mut replays: u32) -> Result<Response, Error> {
        loop {
            let outgoing = self.inner.decorator.decorate(&request).await;
            let response = self.inner.transport.send(outgoing).await?;

            match self.inner.coordinator.classify(&response, replays) {
                Disposition::Pass => return Ok(response),
                Disposition::ExpiredRetried => {
                    debug!(status = %response.status(), "Expired again after replay");
                    return Ok(response);
                }
                Disposition::ExpiredFirst => {
                    // Spend the replay before anything else so a second
                    // expiry always terminates.
                    replays += 1;
                    debug!("Access token expired, refreshing");
                    self.inner.coordinator.refresh().await?;
                    debug!("Replaying request with refreshed token");
                }
            }
        }
    }

    /// Resolve a path against the configured base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        self.inner.config.base_url.join(path)
    }

    /// Build a request for `path` relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<Request, Error> {
        Ok(Request::new(method, self.url(path)?))
    }

    pub fn get(&self, path: &str) -> Result<Request, Error> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<Request, Error> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> Result<Request, Error> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> Result<Request, Error> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> Result<Request, Error> {
        self.request(Method::DELETE, path)
    }

    /// The credential store this client reads and writes.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.config.base_url)
            .field("coordinator", &self.inner.coordinator)
            .finish_non_exhaustive()
    }
}
