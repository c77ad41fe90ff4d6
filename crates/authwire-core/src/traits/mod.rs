//! Collaborator traits the client pipeline is built on.

mod navigator;
mod store;
mod transport;

pub use navigator::Navigator;
pub use store::CredentialStore;
pub use transport::Transport;
