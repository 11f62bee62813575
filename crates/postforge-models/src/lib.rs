//! Provider client implementations for Postforge.
//!
//! This crate provides concrete implementations of the `Model` trait plus
//! the retrying `CompletionClient` used by the generation pipeline.
//!
//! # Supported Providers
//!
//! - **Mock**: Deterministic offline output for testing and development
//! - **OpenAI**: GPT models used for drafting and refinement (API key required)
//! - **Cohere**: Command models used for candidate ranking (API key required)

pub mod cohere;
pub mod completion;
pub mod factory;
pub mod openai;
pub mod pricing;

use async_trait::async_trait;
use postforge_abstraction::{ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage};
use tracing::debug;

pub use cohere::CohereModel;
pub use completion::{CompletionClient, CompletionOutcome, LengthRecord, RetryPolicy};
pub use factory::{ModelFactory, ModelProvider, ProviderConfig};
pub use openai::OpenAIModel;
pub use pricing::{estimate_cost, pricing_for, ModelPricing};

/// A mock implementation of the `Model` trait for testing and offline runs.
///
/// Produces a short, deterministic post-shaped completion that embeds the
/// last user message so callers can assert on prompt flow.
#[derive(Debug, Default)]
pub struct MockModel {
    id: String,
}

impl MockModel {
    /// Creates a new `MockModel` with the given ID.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Model for MockModel {
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
            model_id = %self.id,
            message_count = messages.len(),
            parameters = ?parameters,
            "MockModel generating chat completion"
        );

        let user_excerpt = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.chars().take(80).collect::<String>())
            .unwrap_or_default();

        let content = format!(
            "Most teams get this wrong.\n\n\
             Here is what actually matters about: {user_excerpt}\n\n\
             Practical takeaway: start small, measure weekly, assign one owner.\n\n\
             What has your experience been?"
        );

        let prompt_tokens = messages.iter().map(|m| count_tokens(&m.content)).sum::<u32>();
        let completion_tokens = count_tokens(&content);

        Ok(ModelResponse {
            content,
            model_id: Some(self.id.clone()),
            usage: Some(ModelUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

/// Count tokens in a string (simplified: word count).
///
/// For a real implementation, this would use a proper tokenizer.
#[allow(clippy::cast_possible_truncation)]
fn count_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_echoes_topic() {
        let model = MockModel::new("mock-1".to_string());
        let messages = vec![
            ChatMessage::system("You are a copywriter."),
            ChatMessage::user("AI adoption in SME teams"),
        ];
        let response = model.generate_chat_completion(&messages, None).await.unwrap();
        assert!(response.content.contains("AI adoption in SME teams"));
        assert_eq!(response.model_id.as_deref(), Some("mock-1"));
        assert!(response.usage.unwrap().total_tokens > 0);
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("one two three"), 3);
        assert_eq!(count_tokens(""), 0);
    }
}
