//! Pipeline error types.

use postforge_abstraction::ModelError;
use postforge_core::{ConfigError, TemplateError};
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Degradable conditions (retried-out provider calls, unparseable
/// evaluator or brand-checker output) never surface here; they are folded
/// into the run's metadata instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every angle draft came back empty.
    #[error("failed to generate any usable candidate drafts")]
    NoUsableDrafts,

    /// Fatal configuration problem (bad value, unsupported post type).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Prompt template missing or incomplete.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Provider client could not be constructed (e.g., missing API key).
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
