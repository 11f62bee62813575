//! Prompt assembly.
//!
//! Loads the shared system prompt and per-post-type templates from the
//! prompt directory, fills placeholders, and appends the optional angle
//! instruction as a labeled suffix.

use crate::post::PostType;
use crate::template::{PromptTemplate, Result, TemplateValues};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the shared system prompt.
pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.md";

/// Audience label used when the caller does not supply one.
pub const DEFAULT_AUDIENCE: &str = "SME decision makers";

/// Placeholder value for market context until a market-data source exists.
const MARKET_CONTEXT_PLACEHOLDER: &str = "N/A";

/// Locates and loads prompt template files.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    dir: PathBuf,
}

impl PromptLibrary {
    /// Creates a library rooted at the given prompt directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// The prompt directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the shared system prompt, trimmed.
    ///
    /// # Errors
    /// Fails if the file is missing or unreadable.
    pub fn system_prompt(&self) -> Result<String> {
        let template = PromptTemplate::load(self.dir.join(SYSTEM_PROMPT_FILE))?;
        Ok(template.content().trim().to_string())
    }

    /// Loads the user-prompt template for a post type.
    ///
    /// # Errors
    /// Fails if the file is missing or unreadable.
    pub fn post_template(&self, post_type: PostType) -> Result<PromptTemplate> {
        let path = self.dir.join(post_type.template_file());
        debug!(post_type = %post_type, path = %path.display(), "Loading post template");
        PromptTemplate::load(path)
    }

    /// Repo-relative file name for a post type's template, for metadata.
    pub fn template_name(&self, post_type: PostType) -> String {
        format!("{}/{}", self.dir.display(), post_type.template_file())
    }

    /// Repo-relative file name of the system prompt, for metadata.
    pub fn system_prompt_name(&self) -> String {
        format!("{}/{}", self.dir.display(), SYSTEM_PROMPT_FILE)
    }
}

/// Assembles the user prompt for one drafting call.
///
/// Fills the template's topic/audience/goal/context placeholders and, when
/// an angle instruction is given, appends it as a labeled suffix.
///
/// # Errors
/// Fails if the template references a placeholder with no value.
pub fn assemble_user_prompt(
    template: &PromptTemplate,
    topic: &str,
    audience: &str,
    business_objective: &str,
    brand_context: &str,
    angle_instruction: Option<&str>,
) -> Result<String> {
    let values = TemplateValues::new()
        .with("topic", topic)
        .with("audience", audience)
        .with("goal", business_objective)
        .with("brand_context", brand_context)
        .with("market_context", MARKET_CONTEXT_PLACEHOLDER);

    let base = template.render(&values)?;
    match angle_instruction {
        None => Ok(base),
        Some(instruction) => {
            Ok(format!("{base}\n\nAdditional angle instruction:\n- {instruction}"))
        }
    }
}
