//! Post type enumeration.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of LinkedIn post to generate. Each type maps to its own
/// prompt template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    /// Opinionated authority-building post.
    ThoughtLeadership,
    /// Step-by-step practical guidance.
    Educational,
    /// Commentary on a market trend.
    TrendCommentary,
}

impl PostType {
    /// All supported post types, in stable order.
    pub const ALL: [Self; 3] = [Self::ThoughtLeadership, Self::Educational, Self::TrendCommentary];

    /// Stable identifier used in CLI flags and metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThoughtLeadership => "thought_leadership",
            Self::Educational => "educational",
            Self::TrendCommentary => "trend_commentary",
        }
    }

    /// Template file name for this post type.
    pub fn template_file(self) -> &'static str {
        match self {
            Self::ThoughtLeadership => "thought_leadership.md",
            Self::Educational => "educational.md",
            Self::TrendCommentary => "trend_commentary.md",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "thought_leadership" => Ok(Self::ThoughtLeadership),
            "educational" => Ok(Self::Educational),
            "trend_commentary" => Ok(Self::TrendCommentary),
            other => Err(ConfigError::UnsupportedPostType(other.to_string())),
        }
    }
}
