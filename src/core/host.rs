//! Capabilities the embedding host provides to the session.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Host-side actions: destination choice, OS integration, confirmation, notifications.
#[async_trait]
pub trait Host: Send + Sync {
    /// Destination for a saved image, or `None` when the user cancels.
    async fn choose_save_path(&self, suggested_name: &str) -> Option<PathBuf>;

    /// Open a file with the OS default application.
    fn open_in_os(&self, path: &Path) -> io::Result<()>;

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, message: &str) -> bool;

    /// Informational notification shown outside the UI message channel.
    fn notify(&self, message: &str);
}
