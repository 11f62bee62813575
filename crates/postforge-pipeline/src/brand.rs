//! Brand-consistency checking.
//!
//! Scores a finished post against a voice rubric via one provider call.
//! Parsing is tolerant: when no integer score can be extracted the result
//! degrades to score 0 with the full raw response as feedback.

use crate::metadata::BrandCheckResult;
use once_cell::sync::Lazy;
use postforge_abstraction::{ChatMessage, ModelParameters};
use postforge_models::CompletionClient;
use regex::Regex;
use tracing::{debug, warn};

static SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*score\s*[:=]?\s*(\d{1,3})\b").unwrap());
static FEEDBACK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)feedback\s*[:=]\s*(.+)").unwrap());
static BARE_SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,3})\b").unwrap());

/// A score and feedback summary parsed from a raw rubric response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScore {
    /// Parsed integer score.
    pub score: i64,
    /// Feedback summary; the full raw response when no labeled feedback
    /// was found.
    pub feedback: String,
}

/// Extracts a score and feedback summary from a raw response.
///
/// A labeled `SCORE:` line wins; otherwise the first bare integer in
/// 0..=100 is taken. Returns `None` when neither is present.
pub fn parse_score(raw: &str) -> Option<ParsedScore> {
    let score = SCORE_LINE
        .captures(raw)
        .and_then(|c| c[1].parse::<i64>().ok())
        .or_else(|| {
            BARE_SCORE
                .captures_iter(raw)
                .filter_map(|c| c[1].parse::<i64>().ok())
                .find(|n| (0..=100).contains(n))
        })?;

    let feedback = FEEDBACK_LINE
        .captures(raw)
        .map_or_else(|| raw.trim().to_string(), |c| c[1].trim().to_string());

    Some(ParsedScore { score, feedback })
}

/// Builds the rubric-scoring prompt for a finished post.
fn build_rubric_prompt(post: &str) -> String {
    format!(
        "You are a brand-consistency reviewer for a small-business advisory brand.\n\n\
         Rubric: direct and practical voice, first-person, specific to SME\n\
         operations, no hype or buzzwords, short paragraphs, ends with a\n\
         question or a clear call to action.\n\n\
         Score the post below from 0 to 100 against the rubric, then summarize\n\
         the most important gaps. Respond in exactly this format:\n\
         SCORE: <number>\n\
         FEEDBACK: <short summary>\n\n\
         POST:\n{post}"
    )
}

/// Checks posts against the brand rubric.
pub struct BrandChecker {
    client: CompletionClient,
}

impl BrandChecker {
    /// Creates a checker over the drafting completion client.
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Scores a post.
    ///
    /// Never fails: a failed call or unparseable response yields score 0
    /// with the raw response preserved as feedback.
    pub async fn check(&self, post: &str, parameters: &ModelParameters) -> BrandCheckResult {
        let prompt = build_rubric_prompt(post);
        let outcome =
            self.client.complete(&[ChatMessage::user(prompt)], parameters.clone()).await;

        match parse_score(&outcome.text) {
            Some(parsed) => {
                debug!(score = parsed.score, "Brand check scored post");
                BrandCheckResult {
                    score: parsed.score,
                    feedback_summary: parsed.feedback,
                    parse_failed: false,
                    llm: outcome,
                }
            }
            None => {
                warn!(
                    error = outcome.error.as_deref().unwrap_or("no parsable score"),
                    "Brand check response unusable; defaulting to score 0"
                );
                BrandCheckResult {
                    score: 0,
                    feedback_summary: outcome.text.clone(),
                    parse_failed: true,
                    llm: outcome,
                }
            }
        }
    }
}
