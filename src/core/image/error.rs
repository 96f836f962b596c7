//! Generation error types and the classification of remote failures.

use super::transport::TransportError;

/// Errors from the image generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Image client is not initialized. Please set your Gemini API key first.")]
    NotInitialized,
    #[error("Invalid API key. Please check your Gemini API key.")]
    InvalidCredential,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("No response received from the image API.")]
    EmptyResponse,
    #[error("No image was generated. The model may have returned text only.")]
    NoImageProduced,
    #[error("{0}")]
    Unexpected(String),
}

/// Classify a remote failure by its message text.
///
/// This is a substring heuristic, not a structured error code: a message mentioning
/// `"API key"` is a credential failure, one mentioning `"quota"` or `"rate"` is a
/// rate limit, anything else is passed through unchanged. Matching is case-sensitive,
/// and `"rate"` also matches words such as "generate", so transport messages must not
/// embed request URLs. Replace this function if the API grows structured codes.
pub fn classify_api_message(message: &str) -> GenerationError {
    if message.contains("API key") {
        GenerationError::InvalidCredential
    } else if message.contains("quota") || message.contains("rate") {
        GenerationError::RateLimited
    } else {
        GenerationError::Unexpected(message.to_string())
    }
}

impl From<TransportError> for GenerationError {
    fn from(e: TransportError) -> Self {
        classify_api_message(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_message_is_invalid_credential() {
        let err = classify_api_message("API key not valid. Please pass a valid API key.");
        assert_eq!(err, GenerationError::InvalidCredential);
    }

    #[test]
    fn quota_and_rate_messages_are_rate_limited() {
        assert_eq!(
            classify_api_message("Resource has been exhausted (e.g. check quota)."),
            GenerationError::RateLimited
        );
        assert_eq!(
            classify_api_message("rate limit reached for requests"),
            GenerationError::RateLimited
        );
    }

    #[test]
    fn credential_match_takes_precedence() {
        let err = classify_api_message("API key quota exceeded");
        assert_eq!(err, GenerationError::InvalidCredential);
    }

    #[test]
    fn other_messages_pass_through() {
        let err = classify_api_message("connection refused");
        assert_eq!(err, GenerationError::Unexpected("connection refused".to_string()));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn transport_api_error_is_classified() {
        let err: GenerationError = TransportError::Api {
            status: 400,
            message: "API key expired. Please renew the API key.".to_string(),
        }
        .into();
        assert_eq!(err, GenerationError::InvalidCredential);
    }
}
