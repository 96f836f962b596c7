//! Message protocol between the UI surface and the session.
//!
//! Both directions are tagged unions keyed by `type`, with camelCase names.

use serde::{Deserialize, Serialize};

use crate::core::config::{AspectRatio, Settings};
use crate::core::image::GeneratedImage;
use crate::core::selection::SelectionSnapshot;
use crate::core::templates::Template;

/// Commands sent by the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Inbound {
    Ready,
    Generate {
        #[serde(default)]
        prompt: String,
        pre_prompt_id: String,
        #[serde(default)]
        use_selection: bool,
    },
    SaveApiKey {
        api_key: String,
    },
    DeleteApiKey,
    DownloadImage {
        #[serde(default)]
        base64: String,
        #[serde(default)]
        filename: Option<String>,
    },
    #[serde(rename = "openInOS")]
    OpenInOs {
        #[serde(default)]
        base64: String,
    },
    AddPrePrompt {
        name: String,
        prompt: String,
    },
    UpdatePrePrompt {
        id: String,
        name: String,
        prompt: String,
    },
    DeletePrePrompt {
        id: String,
    },
    ConfirmDeletePrePrompt {
        id: String,
    },
    GetSelection,
}

/// Settings as reported to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub aspect_ratio: AspectRatio,
    pub model: String,
}

impl From<Settings> for UiConfig {
    fn from(settings: Settings) -> Self {
        Self {
            aspect_ratio: settings.aspect_ratio,
            model: settings.model,
        }
    }
}

/// Results and notifications sent to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outbound {
    Init {
        has_api_key: bool,
        pre_prompts: Vec<Template>,
        selection: Option<SelectionSnapshot>,
        config: UiConfig,
    },
    Generating,
    Generated {
        image: GeneratedImage,
    },
    Error {
        message: String,
    },
    PrePromptsUpdated {
        pre_prompts: Vec<Template>,
    },
    SelectionChanged {
        selection: Option<SelectionSnapshot>,
    },
    ApiKeyUpdated {
        has_api_key: bool,
    },
    ConfirmDelete {
        id: String,
    },
}

impl Outbound {
    pub fn error(message: impl Into<String>) -> Self {
        Outbound::Error {
            message: message.into(),
        }
    }
}

/// Events pushed by the host editor, independent of the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hostEvent", rename_all = "camelCase")]
pub enum HostEvent {
    /// The active selection changed; empty text means nothing is selected.
    SelectionChanged {
        #[serde(default)]
        text: String,
    },
}
