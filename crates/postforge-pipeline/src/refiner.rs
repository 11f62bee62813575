//! Draft refinement.
//!
//! One rewrite cycle over a draft, optionally steered by brand-checker
//! feedback. A failed or empty rewrite falls back to the input draft so
//! callers never lose the prior text.

use crate::metadata::RefinementResult;
use postforge_abstraction::{ChatMessage, ModelParameters};
use postforge_core::PostType;
use postforge_models::CompletionClient;
use std::fmt::Write;
use tracing::{debug, warn};

/// Brand-checker output carried into a feedback-driven refinement pass.
#[derive(Debug, Clone)]
pub struct BrandFeedback {
    /// Feedback summary from the brand check.
    pub summary: String,
    /// Score from the brand check.
    pub score: i64,
}

/// Builds the rewrite prompt for one refinement pass.
fn build_refinement_prompt(
    draft: &str,
    topic: &str,
    post_type: PostType,
    business_objective: &str,
    feedback: Option<&BrandFeedback>,
) -> String {
    let mut prompt = format!(
        "Rewrite the LinkedIn post draft below into a stronger version.\n\n\
         Topic: {topic}\n\
         Post type: {post_type}\n\
         Business objective: {business_objective}\n\n\
         Keep the core argument and structure. Sharpen the hook, cut filler,\n\
         keep paragraphs short, and end with a question or clear call to action.\n"
    );

    if let Some(feedback) = feedback {
        let _ = write!(
            &mut prompt,
            "\nA brand reviewer scored the previous version {}/100.\n\
             Address this feedback explicitly in the rewrite:\n- {}\n",
            feedback.score,
            feedback.summary.trim()
        );
    }

    let _ = write!(&mut prompt, "\nDRAFT:\n{draft}\n\nReturn only the rewritten post.");
    prompt
}

/// Runs refinement passes over drafts.
pub struct Refiner {
    client: CompletionClient,
}

impl Refiner {
    /// Creates a refiner over the drafting completion client.
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Refines a draft, optionally incorporating brand feedback.
    ///
    /// Returns the original draft text when the call yields empty output.
    pub async fn refine(
        &self,
        draft: &str,
        topic: &str,
        post_type: PostType,
        business_objective: &str,
        feedback: Option<&BrandFeedback>,
        parameters: &ModelParameters,
    ) -> RefinementResult {
        let incorporated_feedback = feedback.is_some();
        let prompt =
            build_refinement_prompt(draft, topic, post_type, business_objective, feedback);
        let outcome =
            self.client.complete(&[ChatMessage::user(prompt)], parameters.clone()).await;

        let text = if outcome.text.is_empty() {
            warn!(
                error = outcome.error.as_deref().unwrap_or("empty completion"),
                "Refinement yielded no text; keeping prior draft"
            );
            draft.to_string()
        } else {
            debug!(chars = outcome.text.len(), incorporated_feedback, "Refined draft");
            outcome.text.clone()
        };

        RefinementResult { text, incorporated_feedback, llm: outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_feedback() {
        let prompt = build_refinement_prompt(
            "Original draft.",
            "AI adoption",
            PostType::Educational,
            "Educate operators",
            None,
        );
        assert!(prompt.contains("DRAFT:\nOriginal draft."));
        assert!(prompt.contains("Post type: educational"));
        assert!(!prompt.contains("brand reviewer"));
    }

    #[test]
    fn test_prompt_embeds_feedback_and_score() {
        let feedback =
            BrandFeedback { summary: "Too much jargon; weak CTA.".to_string(), score: 58 };
        let prompt = build_refinement_prompt(
            "Original draft.",
            "AI adoption",
            PostType::Educational,
            "Educate operators",
            Some(&feedback),
        );
        assert!(prompt.contains("58/100"));
        assert!(prompt.contains("- Too much jargon; weak CTA."));
    }
}
