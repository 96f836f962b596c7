//! Host capabilities for a headless stdio front-end.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::app;
use crate::core::host::Host;

const FALLBACK_FILE_NAME: &str = "diagram.png";

/// Saves into a fixed directory, opens files with the OS default application,
/// approves confirmations, and prints notifications to stderr.
///
/// stdin and stdout carry the protocol, so there is no way to prompt the user.
#[derive(Debug, Clone)]
pub struct StdioHost {
    save_dir: PathBuf,
}

impl StdioHost {
    pub fn new(save_dir: PathBuf) -> Self {
        Self { save_dir }
    }
}

/// Keep only the final path component of a suggested name.
fn file_name_only(suggested: &str) -> &str {
    Path::new(suggested)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
}

#[async_trait]
impl Host for StdioHost {
    async fn choose_save_path(&self, suggested_name: &str) -> Option<PathBuf> {
        Some(self.save_dir.join(file_name_only(suggested_name)))
    }

    fn open_in_os(&self, path: &Path) -> io::Result<()> {
        log::debug!("opening {}", path.display());
        opener::open(path).map_err(io::Error::other)
    }

    async fn confirm(&self, message: &str) -> bool {
        log::info!("auto-confirming: {}", message);
        true
    }

    fn notify(&self, message: &str) {
        eprintln!("{}: {}", app::NAME, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_path_stays_in_save_dir() {
        let host = StdioHost::new(PathBuf::from("/out"));
        assert_eq!(
            host.choose_save_path("../../etc/passwd").await,
            Some(PathBuf::from("/out/passwd"))
        );
        assert_eq!(
            host.choose_save_path("diagram-1.png").await,
            Some(PathBuf::from("/out/diagram-1.png"))
        );
        assert_eq!(
            host.choose_save_path("..").await,
            Some(PathBuf::from("/out").join(FALLBACK_FILE_NAME))
        );
    }

    #[tokio::test]
    async fn confirmations_are_approved() {
        assert!(StdioHost::new(PathBuf::from(".")).confirm("Delete?").await);
    }
}
