//! API key storage: a single opaque secret behind an async get/set/delete interface.
//!
//! The file-backed store keeps the key in the config directory with restrictive
//! permissions (0o600 on Unix). Deleting an absent key is a no-op.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::core::paths;

/// Errors when loading, storing, or deleting the API key.
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to access API key: {0}")]
    Io(#[from] io::Error),
}

/// Opaque storage for the API credential.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, SecretStoreError>;

    async fn set(&self, secret: &str) -> Result<(), SecretStoreError>;

    async fn delete(&self) -> Result<(), SecretStoreError>;

    /// True when a non-empty secret is stored. Read failures count as absent.
    async fn has(&self) -> bool {
        match self.get().await {
            Ok(secret) => secret.is_some_and(|s| !s.is_empty()),
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }
}

/// Stores the key in `<config dir>/api-key`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located in the given config directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(paths::API_KEY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    /// Returns `None` if the file is absent or holds only whitespace.
    async fn get(&self) -> Result<Option<String>, SecretStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let key = content.trim();
                Ok(if key.is_empty() {
                    None
                } else {
                    Some(key.to_string())
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the config dir if needed. On Unix, sets file permissions to 0o600.
    async fn set(&self, secret: &str) -> Result<(), SecretStoreError> {
        let dir = self.path.parent().ok_or(SecretStoreError::NoConfigDir)?;
        tokio::fs::create_dir_all(dir).await?;

        let mut content = secret.trim().to_string();
        content.push('\n');
        tokio::fs::write(&self.path, content).await?;

        #[cfg(unix)]
        {
            let mut perms = tokio::fs::metadata(&self.path).await?.permissions();
            perms.set_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }

        Ok(())
    }

    async fn delete(&self) -> Result<(), SecretStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, used when no config directory is available and in tests.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secret: Mutex<Option<String>>,
}

impl MemorySecretStore {
    #[cfg(test)]
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: Mutex::new(Some(secret.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.secret.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self) -> Result<Option<String>, SecretStoreError> {
        Ok(self.slot().clone())
    }

    async fn set(&self, secret: &str) -> Result<(), SecretStoreError> {
        *self.slot() = Some(secret.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<(), SecretStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::in_dir(dir.path());

        store.set("  sk-test-key-123 ").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("sk-test-key-123"));
        assert!(store.has().await);
    }

    #[tokio::test]
    async fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::in_dir(&dir.path().join("nested"));
        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.has().await);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::in_dir(dir.path());
        store.delete().await.unwrap();
        store.set("k").await.unwrap();
        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn whitespace_only_file_counts_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::in_dir(dir.path());
        std::fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.has().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn key_file_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::in_dir(dir.path());
        store.set("secret").await.unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn memory_store_has_requires_non_empty() {
        let store = MemorySecretStore::default();
        assert!(!store.has().await);
        store.set("").await.unwrap();
        assert!(!store.has().await);
        store.set("abc").await.unwrap();
        assert!(store.has().await);
        store.delete().await.unwrap();
        assert!(!store.has().await);
    }
}
