//! Cohere model implementation.
//!
//! Implements the `Model` trait against Cohere's v2 chat API. The pipeline
//! uses a Cohere model as the second opinion that ranks candidate drafts.

use async_trait::async_trait;
use postforge_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error};

/// Environment variable holding the evaluator provider credential.
pub const COHERE_API_KEY_VAR: &str = "COHERE_API_KEY";

/// Cohere model implementation.
#[derive(Debug, Clone)]
pub struct CohereModel {
    /// The model ID (e.g., "command-a-03-2025").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// The base URL for the Cohere API.
    base_url: String,
    /// Per-request timeout, if configured.
    request_timeout: Option<Duration>,
    /// HTTP client for making requests.
    client: Client,
}

impl CohereModel {
    /// Creates a new `CohereModel` with the given model ID, reading the API
    /// key from the environment.
    ///
    /// # Errors
    /// Returns a `ModelError` if `COHERE_API_KEY` is not set.
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = env::var(COHERE_API_KEY_VAR)
            .map_err(|_| ModelError::MissingApiKey(COHERE_API_KEY_VAR.to_string()))?;
        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a new `CohereModel` with an explicit API key.
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url: "https://api.cohere.com".to_string(),
            request_timeout: None,
            client: Client::new(),
        }
    }

    /// Overrides the API base URL (used for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Model for CohereModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        let messages = vec![ChatMessage::user(prompt)];
        self.generate_chat_completion(&messages, parameters).await
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "CohereModel generating chat completion"
        );

        let url = format!("{}/v2/chat", self.base_url);

        let cohere_messages: Vec<CohereMessage> = messages
            .iter()
            .map(|msg| CohereMessage { role: msg.role.clone(), content: msg.content.clone() })
            .collect();

        let mut request_body = CohereRequest {
            model: self.model_id.clone(),
            messages: cohere_messages,
            temperature: None,
            max_tokens: None,
        };
        if let Some(params) = parameters {
            request_body.temperature = params.temperature;
            request_body.max_tokens = params.max_tokens;
        }

        let mut request = self.client.post(&url).bearer_auth(&self.api_key).json(&request_body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Failed to send request to Cohere API");
            if e.is_timeout() {
                ModelError::Timeout(format!("Cohere request timed out: {}", e))
            } else {
                ModelError::RequestError(format!("Network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Cohere API returned error status");

            if status.as_u16() == 429 {
                return Err(ModelError::RateLimited {
                    provider: "cohere".to_string(),
                    message: Some(error_text),
                });
            }
            if status.is_server_error() {
                return Err(ModelError::ServerError {
                    status: status.as_u16(),
                    message: error_text,
                });
            }
            return Err(ModelError::ModelResponseError(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let cohere_response: CohereResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Cohere API response");
            ModelError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        // Cohere returns assistant output as a list of typed content blocks;
        // only the text blocks are relevant here.
        let content = cohere_response
            .message
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if content.is_empty() {
            error!("No text content in Cohere API response");
            return Err(ModelError::ModelResponseError(
                "No text content in API response".to_string(),
            ));
        }

        let usage = cohere_response.usage.and_then(|u| u.billed_units).map(|b| {
            let prompt_tokens = b.input_tokens.unwrap_or(0.0) as u32;
            let completion_tokens = b.output_tokens.unwrap_or(0.0) as u32;
            ModelUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Cohere API request/response structures

#[derive(Debug, Serialize)]
struct CohereRequest {
    model: String,
    messages: Vec<CohereMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CohereMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CohereResponse {
    message: CohereAssistantMessage,
    usage: Option<CohereUsage>,
}

#[derive(Debug, Deserialize)]
struct CohereAssistantMessage {
    #[serde(default)]
    content: Vec<CohereContentBlock>,
}

#[derive(Debug, Deserialize)]
struct CohereContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct CohereUsage {
    billed_units: Option<CohereBilledUnits>,
}

#[derive(Debug, Deserialize)]
struct CohereBilledUnits {
    input_tokens: Option<f64>,
    output_tokens: Option<f64>,
}
