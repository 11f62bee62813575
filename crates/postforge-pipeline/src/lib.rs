//! Generation pipeline for Postforge.
//!
//! Drives the end-to-end sequence: candidate drafts across fixed angle
//! strategies, evaluator selection, refinement, and brand-consistency
//! checking. Every provider call is issued and awaited in strict sequence.

pub mod angles;
pub mod brand;
pub mod candidates;
pub mod error;
pub mod evaluator;
pub mod metadata;
pub mod pipeline;
pub mod refiner;

pub use angles::{AngleStrategy, ANGLE_STRATEGIES};
pub use brand::{parse_score, BrandChecker, ParsedScore};
pub use candidates::CandidateGenerator;
pub use error::{PipelineError, Result};
pub use evaluator::{parse_selection, CandidateEvaluator, ParsedSelection};
pub use metadata::{
    BrandCheckBlock, BrandCheckResult, Candidate, CandidateGenerationRecord, EvaluationResult,
    EvaluatorRecord, GenerationMetadata, PromptFiles, RefinementBlock, RefinementResult,
};
pub use pipeline::{GenerationRequest, Pipeline, PipelineRun};
pub use refiner::{BrandFeedback, Refiner};
