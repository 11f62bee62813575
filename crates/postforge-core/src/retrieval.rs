//! Knowledge-base retrieval.
//!
//! A small keyword lookup over a local document set. The pipeline takes
//! the retriever as an owned trait object so runs are testable with a
//! stub; the file-backed `KnowledgeBase` is the production implementation.

use std::fs;
use std::path::{Path, PathBuf};
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, warn};

/// Context string returned when no document matches the topic.
pub const NO_CONTEXT_FALLBACK: &str = "No brand context available.";

/// How many top-scoring documents contribute to the context.
const MAX_CONTEXT_DOCUMENTS: usize = 2;

/// Max characters excerpted per document.
const MAX_EXCERPT_CHARS: usize = 600;

/// Retrieval errors.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// I/O error while reading the document set.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies supporting context snippets for a topic.
pub trait ContextRetriever: Send + Sync {
    /// Returns context text relevant to the topic; never fails, degrading
    /// to a fixed no-context string instead.
    fn search(&self, topic: &str) -> String;
}

/// One loaded knowledge-base document.
#[derive(Debug, Clone)]
pub struct Document {
    /// File stem used to label excerpts.
    pub name: String,
    /// Full document text.
    pub content: String,
}

/// File-backed knowledge base over a directory of `.md`/`.txt` documents.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    root: PathBuf,
    documents: Vec<Document>,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf(), documents: Vec::new() }
    }

    /// Loads every `.md` and `.txt` file under the root directory.
    ///
    /// A missing directory is not an error: the knowledge base stays empty
    /// and searches degrade to the no-context fallback.
    ///
    /// # Errors
    /// Returns error if the directory exists but cannot be read.
    pub fn load_all(&mut self) -> Result<usize, RetrievalError> {
        self.documents.clear();

        if !self.root.exists() {
            warn!(root = %self.root.display(), "Knowledge directory missing; no context will be retrieved");
            return Ok(0);
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("md" | "txt")
                )
            })
            .collect();
        entries.sort();

        for path in entries {
            let content = fs::read_to_string(&path)?;
            let name = path
                .file_stem()
                .map_or_else(|| "document".to_string(), |stem| stem.to_string_lossy().to_string());
            self.documents.push(Document { name, content });
        }

        debug!(count = self.documents.len(), root = %self.root.display(), "Knowledge base loaded");
        Ok(self.documents.len())
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the knowledge base holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Scores a document against the topic terms: one point per term
    /// occurrence, with a Levenshtein tolerance of 1 for longer terms so
    /// close inflections still count.
    fn score(terms: &[String], document: &Document) -> usize {
        let content = document.content.to_lowercase();
        let words: Vec<&str> = content.split_whitespace().collect();

        terms
            .iter()
            .map(|term| {
                let exact = content.matches(term.as_str()).count();
                if exact > 0 {
                    return exact;
                }
                if term.len() >= 5
                    && words.iter().any(|word| {
                        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                        levenshtein(word, term) <= 1
                    })
                {
                    return 1;
                }
                0
            })
            .sum()
    }

    fn topic_terms(topic: &str) -> Vec<String> {
        topic
            .to_lowercase()
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|word| word.len() >= 3)
            .collect()
    }

    fn excerpt(content: &str) -> &str {
        if content.len() <= MAX_EXCERPT_CHARS {
            return content.trim();
        }
        // Cut on a char boundary at or below the budget.
        let mut end = MAX_EXCERPT_CHARS;
        while !content.is_char_boundary(end) {
            end -= 1;
        }
        content[..end].trim()
    }
}

impl ContextRetriever for KnowledgeBase {
    fn search(&self, topic: &str) -> String {
        let terms = Self::topic_terms(topic);
        if terms.is_empty() || self.documents.is_empty() {
            return NO_CONTEXT_FALLBACK.to_string();
        }

        let mut scored: Vec<(usize, &Document)> = self
            .documents
            .iter()
            .map(|doc| (Self::score(&terms, doc), doc))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        if scored.is_empty() {
            debug!(topic, "No knowledge-base match for topic");
            return NO_CONTEXT_FALLBACK.to_string();
        }

        scored
            .iter()
            .take(MAX_CONTEXT_DOCUMENTS)
            .map(|(_, doc)| format!("From {}:\n{}", doc.name, Self::excerpt(&doc.content)))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}
