//! Retrying completion client.
//!
//! Wraps a `Model` with bounded retry-with-fixed-backoff on transient
//! failures. Exhausted retries degrade to an empty-text outcome with the
//! error recorded, so callers decide how to proceed instead of unwinding.

use crate::pricing::estimate_cost;
use postforge_abstraction::{ChatMessage, Model, ModelError, ModelParameters, ModelUsage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for one completion call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first attempt. Clamped to >= 1.
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: Duration::from_secs(1) }
    }
}

/// Character lengths of the prompt and completion sides of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRecord {
    /// Total characters across all request messages.
    pub prompt_chars: usize,
    /// Characters in the trimmed completion text.
    pub completion_chars: usize,
}

/// The outcome of one (possibly retried) completion call.
///
/// `text` is empty and `error` populated when all attempts failed; this is
/// the degraded result, not an error path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// Trimmed completion text; empty on total failure.
    pub text: String,
    /// Model ID actually used.
    pub model: String,
    /// Number of attempts issued (1-based).
    pub attempts: u32,
    /// Token usage reported by the provider; zeroed when unavailable.
    pub usage: ModelUsage,
    /// Character lengths of prompt and completion.
    pub length: LengthRecord,
    /// Estimated cost in USD from the static price table.
    pub estimated_cost_usd: f64,
    /// Error string from the final failed attempt, if all attempts failed.
    pub error: Option<String>,
}

/// Client that issues chat completions with bounded retries.
#[derive(Clone)]
pub struct CompletionClient {
    model: Arc<dyn Model>,
    policy: RetryPolicy,
}

impl CompletionClient {
    /// Creates a client over the given model with the given retry policy.
    pub fn new(model: Arc<dyn Model>, policy: RetryPolicy) -> Self {
        Self { model, policy }
    }

    /// The wrapped model's ID.
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Issues one chat completion, retrying transient failures.
    ///
    /// Never returns an error: exhausted or permanent failures produce an
    /// outcome with empty text and the error field set.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        parameters: ModelParameters,
    ) -> CompletionOutcome {
        let prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                model_id = %self.model.model_id(),
                attempt,
                max_attempts,
                "Issuing completion request"
            );

            match self.model.generate_chat_completion(messages, Some(parameters.clone())).await {
                Ok(response) => {
                    let text = response.content.trim().to_string();
                    let usage = response.usage.unwrap_or_default();
                    let model = response.model_id.unwrap_or_else(|| self.model.model_id().to_string());
                    let estimated_cost_usd = estimate_cost(&model, &usage);
                    return CompletionOutcome {
                        length: LengthRecord { prompt_chars, completion_chars: text.len() },
                        text,
                        model,
                        attempts: attempt,
                        usage,
                        estimated_cost_usd,
                        error: None,
                    };
                }
                Err(err) => {
                    let retryable = err.is_transient() && attempt < max_attempts;
                    warn!(
                        model_id = %self.model.model_id(),
                        attempt,
                        error = %err,
                        retryable,
                        "Completion attempt failed"
                    );
                    if !retryable {
                        return Self::failed_outcome(
                            self.model.model_id(),
                            attempt,
                            prompt_chars,
                            &err,
                        );
                    }
                    tokio::time::sleep(self.policy.backoff).await;
                }
            }
        }
    }

    fn failed_outcome(
        model_id: &str,
        attempts: u32,
        prompt_chars: usize,
        err: &ModelError,
    ) -> CompletionOutcome {
        CompletionOutcome {
            text: String::new(),
            model: model_id.to_string(),
            attempts,
            usage: ModelUsage::default(),
            length: LengthRecord { prompt_chars, completion_chars: 0 },
            estimated_cost_usd: 0.0,
            error: Some(err.to_string()),
        }
    }
}
