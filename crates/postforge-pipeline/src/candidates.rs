//! Candidate draft generation across the fixed angle strategies.

use crate::angles::ANGLE_STRATEGIES;
use crate::error::{PipelineError, Result};
use crate::metadata::Candidate;
use postforge_abstraction::{ChatMessage, ModelParameters};
use postforge_core::{assemble_user_prompt, PostType, PromptTemplate};
use postforge_models::CompletionClient;
use tracing::{debug, warn};

/// Generates one draft per angle strategy, sequentially, skipping empty
/// results.
pub struct CandidateGenerator<'a> {
    client: &'a CompletionClient,
    system_prompt: &'a str,
    template: &'a PromptTemplate,
}

impl<'a> CandidateGenerator<'a> {
    /// Creates a generator over the drafting client and loaded prompts.
    pub fn new(
        client: &'a CompletionClient,
        system_prompt: &'a str,
        template: &'a PromptTemplate,
    ) -> Self {
        Self { client, system_prompt, template }
    }

    /// Produces candidates for one topic, in angle-strategy order.
    ///
    /// Candidates whose returned text is empty after trimming are skipped.
    ///
    /// # Errors
    /// `NoUsableDrafts` when every angle yields an empty result; template
    /// errors when the prompt cannot be assembled.
    pub async fn generate(
        &self,
        topic: &str,
        post_type: PostType,
        audience: &str,
        business_objective: &str,
        brand_context: &str,
        parameters: &ModelParameters,
    ) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(ANGLE_STRATEGIES.len());

        for angle in &ANGLE_STRATEGIES {
            let user_prompt = assemble_user_prompt(
                self.template,
                topic,
                audience,
                business_objective,
                brand_context,
                Some(angle.instruction),
            )?;
            let messages =
                [ChatMessage::system(self.system_prompt), ChatMessage::user(user_prompt)];

            let outcome = self.client.complete(&messages, parameters.clone()).await;
            if outcome.text.is_empty() {
                warn!(
                    angle = angle.label,
                    error = outcome.error.as_deref().unwrap_or("empty completion"),
                    "Skipping angle with no usable draft"
                );
                continue;
            }

            debug!(
                angle = angle.label,
                chars = outcome.text.len(),
                attempts = outcome.attempts,
                "Generated candidate draft"
            );
            candidates.push(Candidate {
                post_type,
                angle: angle.label.to_string(),
                text: outcome.text.clone(),
                llm: outcome,
            });
        }

        if candidates.is_empty() {
            return Err(PipelineError::NoUsableDrafts);
        }
        Ok(candidates)
    }
}
