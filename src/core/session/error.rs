//! Session-level errors. Their `Display` text is what the UI shows.

use std::io;

use crate::core::api_key::SecretStoreError;
use crate::core::image::GenerationError;
use crate::core::templates::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please set your Gemini API key first.")]
    MissingApiKey,
    #[error("Please enter an API key.")]
    EmptyApiKey,
    #[error("A diagram is already being generated.")]
    Busy,
    #[error("Diagram type not found.")]
    UnknownTemplate(String),
    #[error("Please enter a description or select some text.")]
    EmptyContent,
    #[error("Name and prompt are required.")]
    IncompleteTemplate,
    #[error("Cannot edit default diagram types.")]
    BuiltinEdit,
    #[error("Cannot delete default diagram types.")]
    BuiltinDelete,
    #[error("No image to save. Generate a diagram first.")]
    NoImage,
    #[error("Image data is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),
    #[error("Failed to save image: {0}")]
    Save(io::Error),
    #[error("Failed to open image: {0}")]
    Open(io::Error),
    #[error(transparent)]
    Catalog(CatalogError),
    #[error(transparent)]
    Secrets(#[from] SecretStoreError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<CatalogError> for SessionError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => SessionError::UnknownTemplate(id),
            other => SessionError::Catalog(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_not_found_maps_to_unknown_template() {
        let err: SessionError = CatalogError::NotFound("x".to_string()).into();
        assert!(matches!(err, SessionError::UnknownTemplate(ref id) if id == "x"));
        assert_eq!(err.to_string(), "Diagram type not found.");
    }

    #[test]
    fn generation_errors_keep_their_message() {
        let err: SessionError = GenerationError::RateLimited.into();
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again later.");
    }
}
