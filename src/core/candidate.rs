//! Candidate answer text and its origin tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON value recovered from the raw buffer.
///
/// Fragments are ephemeral: they are re-extracted from the full buffer on
/// every pass and never retained between chunks.
pub type Fragment = serde_json::Value;

/// Where a piece of candidate text is believed to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The upstream stage that produces the user-facing answer.
    Final,
    /// Reasoning, tool, or retrieval stages, or anything untagged.
    Intermediate,
}

impl Origin {
    /// Returns true for [`Origin::Final`].
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }

    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Intermediate => "intermediate",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of text with an origin tag.
///
/// # Examples
///
/// ```
/// use reply_normalizer::core::{CandidateText, Origin};
///
/// let candidate = CandidateText::final_answer("VAT is 7.5%.");
/// assert_eq!(candidate.origin, Origin::Final);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateText {
    /// The extracted text.
    pub content: String,
    /// Origin classification.
    pub origin: Origin,
}

impl CandidateText {
    /// Creates a new candidate.
    #[must_use]
    pub fn new(content: impl Into<String>, origin: Origin) -> Self {
        Self {
            content: content.into(),
            origin,
        }
    }

    /// Creates a final-origin candidate.
    #[must_use]
    pub fn final_answer(content: impl Into<String>) -> Self {
        Self::new(content, Origin::Final)
    }

    /// Creates an intermediate-origin candidate.
    #[must_use]
    pub fn intermediate(content: impl Into<String>) -> Self {
        Self::new(content, Origin::Intermediate)
    }
}
