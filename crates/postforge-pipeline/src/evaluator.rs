//! Candidate evaluation via a second provider.
//!
//! The evaluator ranks all candidates in one call and picks an index.
//! Parsing and fallback policy are separate: `parse_selection` is a pure
//! function returning `Option`, and the evaluator applies the
//! deterministic index-0 default when it returns `None`. Selection never
//! fails.

use crate::metadata::{Candidate, EvaluationResult, EvaluatorRecord};
use once_cell::sync::Lazy;
use postforge_abstraction::{ChatMessage, ModelParameters};
use postforge_core::PostType;
use postforge_models::CompletionClient;
use regex::Regex;
use serde::Deserialize;
use std::fmt::Write;
use tracing::{debug, warn};

static CANDIDATE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)candidate\s*#?\s*(\d+)").unwrap());
static BARE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// A selection parsed out of the evaluator's response. 0-based and
/// in-bounds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelection {
    /// Selected candidate index.
    pub index: usize,
    /// Reasoning text, when present.
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectionJson {
    selection: serde_json::Value,
    reasoning: Option<String>,
}

/// Extracts a candidate selection from a raw evaluator response.
///
/// Candidates are labeled 1-based in the ranking prompt; the returned
/// index is 0-based. Tried in order: a JSON object with a `selection`
/// field (code fences tolerated), a "Candidate N" reference, then the
/// first bare in-range integer. Returns `None` when nothing resolves to
/// an in-bounds index.
pub fn parse_selection(raw: &str, candidate_count: usize) -> Option<ParsedSelection> {
    if candidate_count == 0 {
        return None;
    }
    let in_bounds = |one_based: u64| -> Option<usize> {
        let one_based = usize::try_from(one_based).ok()?;
        if (1..=candidate_count).contains(&one_based) { Some(one_based - 1) } else { None }
    };

    // 1. JSON object, possibly inside a fenced block or surrounding prose.
    if let Some(json_slice) = extract_json_object(raw) {
        if let Ok(parsed) = serde_json::from_str::<SelectionJson>(json_slice) {
            let number = match &parsed.selection {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            if let Some(index) = number.and_then(in_bounds) {
                return Some(ParsedSelection { index, reasoning: parsed.reasoning });
            }
        }
    }

    // 2. "Candidate N" references.
    for capture in CANDIDATE_REF.captures_iter(raw) {
        if let Some(index) = capture[1].parse::<u64>().ok().and_then(in_bounds) {
            return Some(ParsedSelection { index, reasoning: None });
        }
    }

    // 3. First bare integer that lands in range.
    for capture in BARE_INTEGER.captures_iter(raw) {
        if let Some(index) = capture[1].parse::<u64>().ok().and_then(in_bounds) {
            return Some(ParsedSelection { index, reasoning: None });
        }
    }

    None
}

/// Returns the slice between the first `{` and the last `}`, if any.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start { Some(&raw[start..=end]) } else { None }
}

/// Builds the ranking prompt embedding all candidates labeled by position.
pub fn build_ranking_prompt(
    topic: &str,
    post_type: PostType,
    business_objective: &str,
    candidates: &[Candidate],
) -> String {
    let mut prompt = format!(
        "You are ranking LinkedIn post drafts for a small-business marketing brand.\n\n\
         Topic: {topic}\n\
         Post type: {post_type}\n\
         Business objective: {business_objective}\n\n"
    );

    for (position, candidate) in candidates.iter().enumerate() {
        let _ = write!(
            &mut prompt,
            "Candidate {} ({}):\n{}\n\n",
            position + 1,
            candidate.angle,
            candidate.text
        );
    }

    let _ = write!(
        &mut prompt,
        "Pick the single candidate that best serves the business objective.\n\
         Respond with JSON only, in exactly this shape:\n\
         {{\"selection\": <candidate number>, \"reasoning\": \"<one sentence>\"}}"
    );
    prompt
}

/// Ranks candidates with the evaluator provider and selects one.
pub struct CandidateEvaluator {
    client: CompletionClient,
}

impl CandidateEvaluator {
    /// Creates an evaluator over the given (Cohere) completion client.
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Selects the best candidate.
    ///
    /// Never fails: an unparseable or failed evaluation degrades to the
    /// deterministic default of index 0 with `used_fallback` set.
    pub async fn evaluate(
        &self,
        topic: &str,
        post_type: PostType,
        business_objective: &str,
        candidates: &[Candidate],
        parameters: &ModelParameters,
    ) -> EvaluationResult {
        let prompt = build_ranking_prompt(topic, post_type, business_objective, candidates);
        let outcome =
            self.client.complete(&[ChatMessage::user(prompt)], parameters.clone()).await;

        match parse_selection(&outcome.text, candidates.len()) {
            Some(selection) => {
                debug!(
                    selected_index = selection.index,
                    model = %outcome.model,
                    "Evaluator selected candidate"
                );
                EvaluationResult {
                    selected_index: selection.index,
                    evaluator: EvaluatorRecord {
                        model: outcome.model,
                        raw_response: outcome.text,
                        reasoning: selection.reasoning,
                        used_fallback: false,
                        error: outcome.error,
                    },
                }
            }
            None => {
                warn!(
                    model = %outcome.model,
                    error = outcome.error.as_deref().unwrap_or("no resolvable index"),
                    "Evaluator response unusable; falling back to first candidate"
                );
                EvaluationResult {
                    selected_index: 0,
                    evaluator: EvaluatorRecord {
                        model: outcome.model,
                        raw_response: outcome.text,
                        reasoning: None,
                        used_fallback: true,
                        error: outcome.error,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_selection() {
        let raw = r#"{"selection": 2, "reasoning": "tightest hook"}"#;
        let parsed = parse_selection(raw, 3).unwrap();
        assert_eq!(parsed.index, 1);
        assert_eq!(parsed.reasoning.as_deref(), Some("tightest hook"));
    }

    #[test]
    fn test_parse_json_in_code_fence() {
        let raw = "```json\n{\"selection\": \"3\", \"reasoning\": \"case study lands\"}\n```";
        let parsed = parse_selection(raw, 3).unwrap();
        assert_eq!(parsed.index, 2);
    }

    #[test]
    fn test_parse_candidate_reference() {
        let parsed = parse_selection("I would go with Candidate 2 here.", 3).unwrap();
        assert_eq!(parsed.index, 1);
        assert!(parsed.reasoning.is_none());
    }

    #[test]
    fn test_parse_bare_integer() {
        let parsed = parse_selection("The strongest is number 3.", 3).unwrap();
        assert_eq!(parsed.index, 2);
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        assert!(parse_selection("Candidate 7 wins", 3).is_none());
        assert!(parse_selection("0", 3).is_none());
    }

    #[test]
    fn test_unparseable_is_none() {
        assert!(parse_selection("They are all equally good.", 3).is_none());
        assert!(parse_selection("", 3).is_none());
        assert!(parse_selection("anything", 0).is_none());
    }

    #[test]
    fn test_json_with_out_of_bounds_falls_through_to_scan() {
        // JSON says 9 (out of bounds) but the prose names Candidate 1.
        let raw = r#"{"selection": 9} but honestly Candidate 1 is close."#;
        let parsed = parse_selection(raw, 3).unwrap();
        assert_eq!(parsed.index, 0);
    }

    #[test]
    fn test_ranking_prompt_labels_candidates_by_position() {
        let candidates = vec![
            candidate("contrarian", "Draft A"),
            candidate("operational_lesson", "Draft B"),
        ];
        let prompt = build_ranking_prompt(
            "AI adoption",
            PostType::ThoughtLeadership,
            "Build authority",
            &candidates,
        );
        assert!(prompt.contains("Candidate 1 (contrarian):\nDraft A"));
        assert!(prompt.contains("Candidate 2 (operational_lesson):\nDraft B"));
        assert!(prompt.contains("\"selection\""));
    }

    fn candidate(angle: &str, text: &str) -> Candidate {
        Candidate {
            post_type: PostType::ThoughtLeadership,
            angle: angle.to_string(),
            text: text.to_string(),
            llm: postforge_models::CompletionOutcome {
                text: text.to_string(),
                model: "mock".to_string(),
                attempts: 1,
                usage: postforge_abstraction::ModelUsage::default(),
                length: postforge_models::LengthRecord::default(),
                estimated_cost_usd: 0.0,
                error: None,
            },
        }
    }
}
