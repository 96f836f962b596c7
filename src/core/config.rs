//! Generation settings: default aspect ratio and model, resolved fresh on every use.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model used when no override is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Base URL of the generative image API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const ASPECT_RATIO_ENV: &str = "DIAGRAM_STUDIO_ASPECT_RATIO";
const MODEL_ENV: &str = "DIAGRAM_STUDIO_MODEL";
const API_BASE_ENV: &str = "DIAGRAM_STUDIO_API_BASE";

/// Target image aspect ratio. Passed through to the API as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[default]
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors when parsing configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported aspect ratio '{0}' (expected one of 1:1, 3:4, 4:3, 9:16, 16:9)")]
    AspectRatio(String),
}

impl FromStr for AspectRatio {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == trimmed)
            .ok_or_else(|| ConfigError::AspectRatio(trimmed.to_string()))
    }
}

/// Effective generation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub aspect_ratio: AspectRatio,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Build settings from raw optional values, falling back to defaults for
    /// missing, blank, or unrecognized entries.
    pub fn resolve(aspect_ratio: Option<&str>, model: Option<&str>) -> Self {
        let aspect_ratio = match aspect_ratio.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse().unwrap_or_else(|e: ConfigError| {
                log::warn!("{}; using {}", e, AspectRatio::default());
                AspectRatio::default()
            }),
            None => AspectRatio::default(),
        };
        let model = model
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();
        Self {
            aspect_ratio,
            model,
        }
    }
}

/// Source of settings, consulted each time they are needed (never cached).
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Settings;
}

/// Fixed settings (CLI overrides, tests).
impl SettingsSource for Settings {
    fn load(&self) -> Settings {
        self.clone()
    }
}

/// Settings from `DIAGRAM_STUDIO_ASPECT_RATIO` and `DIAGRAM_STUDIO_MODEL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn load(&self) -> Settings {
        let aspect_ratio = env::var(ASPECT_RATIO_ENV).ok();
        let model = env::var(MODEL_ENV).ok();
        Settings::resolve(aspect_ratio.as_deref(), model.as_deref())
    }
}

/// API base URL, overridable with `DIAGRAM_STUDIO_API_BASE`.
pub fn api_base() -> String {
    env::var(API_BASE_ENV)
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}
