//! authwire-file - File-backed credential store for authwire.

mod store;

pub use store::FileCredentialStore;
