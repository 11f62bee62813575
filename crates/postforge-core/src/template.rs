//! Prompt template loading and rendering.
//!
//! Templates are plain text files with `{{name}}` placeholders. Rendering
//! is strict: every placeholder referenced by the template must have a
//! value, and a missing template file is a fatal configuration error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prompt template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A placeholder referenced by the template has no value.
    #[error("missing placeholder value: {0}")]
    MissingPlaceholder(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Values to substitute into a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: HashMap<String, String>,
}

impl TemplateValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A loaded prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    source: Option<PathBuf>,
}

impl PromptTemplate {
    /// Load a template from a file.
    ///
    /// # Errors
    /// `NotFound` if the file does not exist, `Io` if it cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TemplateError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(Self { content, source: Some(path.to_path_buf()) })
    }

    /// Create a template from a string.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self { content: content.into(), source: None }
    }

    /// Raw template content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Source path, if loaded from a file.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else { break };
            let name = after[..end].trim();
            if !name.is_empty() && !name.contains('{') && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            rest = &after[end + 2..];
        }

        names
    }

    /// Render the template, substituting every `{{name}}` placeholder.
    ///
    /// # Errors
    /// `MissingPlaceholder` if any referenced placeholder has no value.
    pub fn render(&self, values: &TemplateValues) -> Result<String> {
        let mut rendered = self.content.clone();
        for name in self.placeholders() {
            let value = values
                .get(&name)
                .ok_or_else(|| TemplateError::MissingPlaceholder(name.clone()))?;
            // Placeholders may be written with inner padding: {{ name }}.
            let padded = format!("{{{{ {} }}}}", name);
            let bare = format!("{{{{{}}}}}", name);
            rendered = rendered.replace(&padded, value).replace(&bare, value);
        }
        Ok(rendered)
    }
}
