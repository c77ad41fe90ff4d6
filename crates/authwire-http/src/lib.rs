//! authwire-http - reqwest-backed transport for authwire.
//!
//! Plug [`ReqwestTransport`] into an [`authwire_core::Client`] to talk to a
//! real HTTP API.

mod transport;

pub use transport::{ReqwestTransport, ReqwestTransportBuilder};
