//! authwire-core - Bearer-token HTTP client with transparent refresh.
//!
//! A [`Client`] wraps any [`Transport`]. Every outgoing request gets the
//! access token from the [`CredentialStore`] as a bearer header. When a
//! response says the token has expired, the refresh token is exchanged for
//! a new access token and the request is replayed once. If the exchange
//! fails, both tokens are cleared and the [`Navigator`] is sent to the
//! login path.
//!
//! Transports, stores and navigators are injected, so the pipeline runs
//! the same against `reqwest`, a file store or in-memory test doubles.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod decorator;
pub mod error;
pub mod memory;
pub mod tokens;
pub mod traits;
pub mod types;

pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, RefreshPolicy};
pub use coordinator::{Disposition, MAX_REPLAYS, RefreshCoordinator};
pub use decorator::RequestDecorator;
pub use error::{Error, InvalidInputError, ProtocolError, RefreshError, StoreError, TransportError};
pub use memory::MemoryCredentialStore;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{CredentialStore, Navigator, Transport};
pub use types::{BaseUrl, Request, Response, Slot};

/// Re-exported so callers can build requests without a direct `http` dependency.
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
