//! Provider abstraction layer for Postforge.
//!
//! Defines the core trait and types for talking to text-generation
//! providers. Concrete clients live in `postforge-models`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when calling a provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The request could not be sent (network failure, DNS, connection reset).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the request with a rate limit (HTTP 429).
    #[error("Provider '{provider}' rate limited{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    RateLimited {
        /// The provider name (e.g., "openai", "cohere").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The provider returned a 5xx-class server error.
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The provider returned a non-retryable error response (e.g., invalid input).
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The model provider is not supported or configured.
    #[error("Unsupported Model Provider: {0}")]
    UnsupportedModelProvider(String),

    /// No API key was supplied and none was found in the environment.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

impl ModelError {
    /// Whether a retry may succeed.
    ///
    /// Timeouts, rate limits, server errors, and network-level failures are
    /// transient; everything else is permanent and must not be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestError(_)
                | Self::Timeout(_)
                | Self::RateLimited { .. }
                | Self::ServerError { .. }
        )
    }
}

/// Represents a message in a conversation with a chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender (e.g., "user", "system").
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Parameters for controlling the model's generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// What sampling temperature to use, between 0 and 2.
    /// Higher values mean the model will take more risks.
    pub temperature: Option<f32>,

    /// The maximum number of tokens to generate in the completion.
    pub max_tokens: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self { temperature: Some(0.7), max_tokens: Some(500) }
    }
}

/// The response from a chat completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated content.
    pub content: String,

    /// Optional: The ID of the model used to generate the response.
    pub model_id: Option<String>,

    /// Optional: Usage statistics for the request.
    pub usage: Option<ModelUsage>,
}

/// Usage statistics for a model request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// A trait for interacting with different text-generation providers.
///
/// All models must be `Send + Sync` to allow sharing behind an `Arc`.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates a completion from a single user prompt.
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Generates a chat completion from the given conversation history.
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ModelError::RequestError("reset".to_string()).is_transient());
        assert!(ModelError::Timeout("60s".to_string()).is_transient());
        assert!(
            ModelError::RateLimited { provider: "openai".to_string(), message: None }
                .is_transient()
        );
        assert!(
            ModelError::ServerError { status: 503, message: "unavailable".to_string() }
                .is_transient()
        );
    }

    #[test]
    fn test_permanent_errors() {
        assert!(!ModelError::ModelResponseError("bad input".to_string()).is_transient());
        assert!(!ModelError::SerializationError("bad json".to_string()).is_transient());
        assert!(!ModelError::MissingApiKey("OPENAI_API_KEY".to_string()).is_transient());
        assert!(!ModelError::UnsupportedModelProvider("ftp".to_string()).is_transient());
    }

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::system("You are a copywriter.");
        assert_eq!(msg.role, "system");
        let msg = ChatMessage::user("Write a post.");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Write a post.");
    }

    #[test]
    fn test_default_parameters() {
        let params = ModelParameters::default();
        assert_eq!(params.temperature, Some(0.7));
        assert_eq!(params.max_tokens, Some(500));
    }
}
