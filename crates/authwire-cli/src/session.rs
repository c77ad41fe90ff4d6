//! Credential file location and the terminal navigator.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use authwire_core::Navigator;
use authwire_file::FileCredentialStore;

use crate::output;

/// Get the default credential file path.
fn default_store_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "authwire").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("credentials.json"))
}

/// Open the credential store, at `path` if given.
pub fn open_store(path: Option<PathBuf>) -> Result<Arc<FileCredentialStore>> {
    let path = match path {
        Some(path) => path,
        None => default_store_path()?,
    };
    tracing::debug!(path = %path.display(), "Using credential file");

    Ok(Arc::new(FileCredentialStore::new(path)))
}

/// There is no login page in a terminal, so navigating to it tells the user
/// how to sign in again.
#[derive(Debug, Default)]
pub struct CliNavigator {
    visited: Mutex<Option<String>>,
}

impl CliNavigator {
    /// The login path the session was sent to, if it was torn down.
    pub fn visited(&self) -> Option<String> {
        self.visited.lock().ok().and_then(|v| v.clone())
    }
}

impl Navigator for CliNavigator {
    fn go_to(&self, path: &str) {
        output::error(&format!("Session expired. Sign in again at {}", path));
        output::hint("Run 'authwire tokens set --access <TOKEN> --refresh <TOKEN>' after signing in.");

        if let Ok(mut visited) = self.visited.lock() {
            *visited = Some(path.to_string());
        }
    }
}
