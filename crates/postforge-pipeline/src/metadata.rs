//! Serializable run records.
//!
//! Everything produced by one pipeline invocation is collected into a
//! `GenerationMetadata` aggregate for observability. None of it is
//! persisted; the caller decides whether to print or drop it.

use postforge_core::PostType;
use postforge_models::CompletionOutcome;
use serde::{Deserialize, Serialize};

/// One generated draft, tagged with its rhetorical angle.
///
/// Created by the candidate generator and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Post type this draft was generated for.
    pub post_type: PostType,
    /// Stable angle label (not a position).
    pub angle: String,
    /// Trimmed draft text; never empty.
    pub text: String,
    /// Record of the provider call that produced this draft.
    pub llm: CompletionOutcome,
}

/// Evaluator call record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorRecord {
    /// Evaluator model ID.
    pub model: String,
    /// Raw evaluator response, preserved for inspection.
    pub raw_response: String,
    /// Reasoning text, when the evaluator supplied one.
    pub reasoning: Option<String>,
    /// True when the response held no resolvable in-bounds index and the
    /// deterministic default (index 0) was used instead.
    pub used_fallback: bool,
    /// Error from the evaluator call, if it failed outright.
    pub error: Option<String>,
}

/// Evaluator selection: index plus call metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Selected candidate index; always within `[0, candidate_count)`.
    pub selected_index: usize,
    /// Evaluator call record.
    pub evaluator: EvaluatorRecord,
}

/// One refinement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementResult {
    /// Refined text; falls back to the input draft when the call yielded
    /// nothing, so it is never empty for a non-empty input.
    pub text: String,
    /// Whether brand feedback was part of the rewrite prompt.
    pub incorporated_feedback: bool,
    /// Record of the provider call.
    pub llm: CompletionOutcome,
}

/// One brand-consistency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandCheckResult {
    /// Provider-assigned score, expected (not enforced) in 0..=100.
    /// Zero when no score could be parsed.
    pub score: i64,
    /// Feedback summary; the full raw response when parsing failed.
    pub feedback_summary: String,
    /// True when no score could be parsed from the response.
    pub parse_failed: bool,
    /// Record of the provider call.
    pub llm: CompletionOutcome,
}

/// Prompt files used for one run, for metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptFiles {
    /// System prompt file.
    pub system: String,
    /// Post-type template file.
    pub template: String,
}

/// Candidate-generation summary block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateGenerationRecord {
    /// Number of usable candidates (at most the number of angles).
    pub count: usize,
    /// Angle labels in candidate order.
    pub angles: Vec<String>,
    /// Selected candidate index.
    pub selected_index: usize,
    /// Angle label of the selected candidate.
    pub selected_angle: String,
    /// Evaluator call record.
    pub evaluator: EvaluatorRecord,
}

/// The two refinement passes of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementBlock {
    /// First pass, without brand feedback.
    pub initial: RefinementResult,
    /// Second pass, incorporating the first brand check's feedback.
    pub feedback_driven: RefinementResult,
}

/// The two brand checks of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandCheckBlock {
    /// Check of the first refinement.
    pub initial: BrandCheckResult,
    /// Check of the final text.
    #[serde(rename = "final")]
    pub final_check: BrandCheckResult,
}

/// Aggregate record for one end-to-end run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Requested topic.
    pub topic: String,
    /// Requested post type.
    pub post_type: PostType,
    /// Requested business objective.
    pub business_objective: String,
    /// Whether retrieval produced real context (vs. the fallback string).
    pub context_used: bool,
    /// Prompt files used.
    pub prompt_files: PromptFiles,
    /// Candidate-generation summary.
    pub candidate_generation: CandidateGenerationRecord,
    /// All usable candidates, in angle order.
    pub candidates: Vec<Candidate>,
    /// Call record of the selected candidate.
    pub llm: CompletionOutcome,
    /// Both refinement passes.
    pub refinement: RefinementBlock,
    /// Both brand checks.
    pub brand_check: BrandCheckBlock,
}
