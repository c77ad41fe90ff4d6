//! Core request, response and credential types.
//!
//! These types enforce their invariants at construction time.

mod base_url;
mod request;
mod response;
mod slot;

pub use base_url::BaseUrl;
pub use request::Request;
pub use response::Response;
pub use slot::Slot;
