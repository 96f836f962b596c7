//! Centralized path helpers for config and cache directories.

use std::path::{Path, PathBuf};

use crate::core::app;

/// File name of the stored API key inside the config directory.
pub const API_KEY_FILE: &str = "api-key";

/// File name of the custom templates list inside the config directory.
pub const TEMPLATES_FILE: &str = "templates.json";

/// Project directories (config, cache) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/diagram-studio/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/diagram-studio/).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Config directory honoring an explicit override (e.g. `--config-dir`).
pub fn resolve_config_dir(override_dir: Option<&Path>) -> Option<PathBuf> {
    match override_dir {
        Some(dir) => Some(dir.to_path_buf()),
        None => config_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_platform_dir() {
        let dir = Path::new("/tmp/diagram-studio-test");
        assert_eq!(resolve_config_dir(Some(dir)), Some(dir.to_path_buf()));
    }
}
