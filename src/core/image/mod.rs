//! Image generation client: builds the final prompt, issues one request, and extracts
//! the first inline image from the response.

mod error;
pub mod transport;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::core::config::{AspectRatio, DEFAULT_MODEL, Settings};

pub use error::GenerationError;
pub use transport::{
    ContentTransport, GenerateContentRequest, GenerateContentResponse, HttpTransport,
};

/// Mime type assumed when the API omits one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Literal joiner between the template fragment and the user content.
pub const PROMPT_JOINER: &str = " showing: ";

/// Options for a single generation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateConfig {
    pub model: String,
    pub aspect_ratio: AspectRatio,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            aspect_ratio: AspectRatio::default(),
        }
    }
}

impl From<&Settings> for GenerateConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            aspect_ratio: settings.aspect_ratio,
        }
    }
}

/// A generated image, base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub base64: String,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        decode_base64(&self.base64)
    }

    /// File extension matching the mime type.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Decode standard base64 image bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(data.trim().as_bytes())
}

/// Image mime type recognized from leading magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// `<fragment> showing: <content>`
pub fn build_prompt(template_fragment: &str, user_content: &str) -> String {
    format!("{}{}{}", template_fragment, PROMPT_JOINER, user_content)
}

/// First part carrying inline image data, normalized to a [`GeneratedImage`].
pub fn extract_image(response: &GenerateContentResponse) -> Result<GeneratedImage, GenerationError> {
    let parts = response.first_parts();
    if parts.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
        .map(|inline| GeneratedImage {
            base64: inline.data.clone(),
            mime_type: inline
                .mime_type
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        })
        .ok_or(GenerationError::NoImageProduced)
}

/// Client bound to an API key. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn ContentTransport>,
    api_key: Option<String>,
}

impl ImageClient {
    pub fn new(transport: Arc<dyn ContentTransport>) -> Self {
        Self {
            transport,
            api_key: None,
        }
    }

    /// Bind the credential for subsequent calls. Last write wins.
    pub fn initialize(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_string());
    }

    /// Drop the bound credential.
    pub fn reset(&mut self) {
        self.api_key = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate one image from a template fragment and user content.
    pub async fn generate_diagram(
        &self,
        template_fragment: &str,
        user_content: &str,
        config: &GenerateConfig,
    ) -> Result<GeneratedImage, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::NotInitialized)?;

        let prompt = build_prompt(template_fragment, user_content);
        let request = GenerateContentRequest::new(&prompt, config.aspect_ratio.as_str());
        log::info!(
            "generating image with {} ({}, {} prompt chars)",
            config.model,
            config.aspect_ratio,
            prompt.chars().count()
        );

        let response = self
            .transport
            .generate_content(api_key, &config.model, &request)
            .await
            .map_err(|e| {
                log::warn!("image request failed: {}", e);
                GenerationError::from(e)
            })?;
        extract_image(&response)
    }
}
