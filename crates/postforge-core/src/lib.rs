//! Core domain plumbing for Postforge.
//!
//! Post types, generation configuration, prompt templates and assembly,
//! and the knowledge-base retrieval collaborator.

pub mod assembler;
pub mod config;
pub mod post;
pub mod retrieval;
pub mod template;

pub use assembler::{assemble_user_prompt, PromptLibrary, DEFAULT_AUDIENCE, SYSTEM_PROMPT_FILE};
pub use config::{ConfigError, FileConfig, GenerationConfig, COHERE_MODEL_OPTIONS, OPENAI_MODEL_OPTIONS};
pub use post::PostType;
pub use retrieval::{ContextRetriever, Document, KnowledgeBase, RetrievalError, NO_CONTEXT_FALLBACK};
pub use template::{PromptTemplate, TemplateError, TemplateValues};
