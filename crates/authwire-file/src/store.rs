//! Filesystem storage for credentials.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use authwire_core::{CredentialStore, Slot, StoreError};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

fn map_io(err: std::io::Error) -> StoreError {
    StoreError::Io {
        message: err.to_string(),
    }
}

/// Create `path` and write `content`, owner-only on Unix from the start.
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// On-disk document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    fn slot(&self, slot: Slot) -> &Option<String> {
        match slot {
            Slot::Access => &self.access,
            Slot::Refresh => &self.refresh,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::Access => &mut self.access,
            Slot::Refresh => &mut self.refresh,
        }
    }
}

/// A [`CredentialStore`] persisted as a single JSON file.
///
/// Writes go to a temporary file that is renamed into place, under an
/// exclusive advisory lock on a sibling `.lock` file, so several processes
/// can share one credential file. On Unix the file is readable by its
/// owner only.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the file at `path`. The file and its parent
    /// directories are created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the credentials were last written, if ever.
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let _lock = self.lock(false)?;
        Ok(self.read_unlocked()?.updated_at)
    }

    /// Remove the credential file entirely.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _lock = self.lock(true)?;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(map_io)?;
            debug!(path = %self.path.display(), "Removed credential file");
        }
        Ok(())
    }

    /// Get the lock file path.
    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Take the advisory lock; it is released when the returned file drops.
    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        let lock_path = self.lock_path();

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(map_io)?;

        if exclusive {
            lock_file.lock_exclusive().map_err(map_io)?;
        } else {
            lock_file.lock_shared().map_err(map_io)?;
        }

        Ok(lock_file)
    }

    fn read_unlocked(&self) -> Result<StoredCredentials, StoreError> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }

        let content = fs::read_to_string(&self.path).map_err(map_io)?;
        if content.trim().is_empty() {
            return Ok(StoredCredentials::default());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    fn write_unlocked(&self, stored: &StoredCredentials) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(stored).map_err(|e| StoreError::Corrupt {
            message: e.to_string(),
        })?;

        let mut temp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        temp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        let temp_path = self.path.with_file_name(temp_name);

        let result = write_private(&temp_path, content.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(map_io(e));
        }
        Ok(())
    }

    /// Read, modify and write the document under the exclusive lock.
    fn update(&self, f: impl FnOnce(&mut StoredCredentials)) -> Result<(), StoreError> {
        let _lock = self.lock(true)?;
        let mut stored = self.read_unlocked()?;
        f(&mut stored);
        stored.updated_at = Some(Utc::now());
        self.write_unlocked(&stored)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        let _lock = self.lock(false)?;
        Ok(self.read_unlocked()?.slot(slot).clone())
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.update(|stored| *stored.slot_mut(slot) = Some(value.to_string()))?;
        debug!(%slot, "Stored credential");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|stored| *stored.slot_mut(slot) = None)?;
        debug!(%slot, "Removed credential");
        Ok(())
    }
}
