//! Content selection from parsed fragments.
//!
//! Decides whether a fragment carries user-facing text, pulls the text out
//! by field priority, and tags it with an origin from the classifier.

use crate::core::{CandidateText, Fragment, Origin};
use crate::normalize::classifier::OriginClassifier;
use serde_json::Value;

/// Content fields checked in priority order.
pub const CONTENT_FIELDS: &[&str] = &["content", "output", "text", "reply", "response", "message"];

/// Wrapper objects searched when no content field is present at the top level.
const NESTED_CONTAINERS: &[&str] = &["data", "json", "body"];

/// How deep nested containers are followed.
const MAX_NESTING: usize = 3;

/// Selects content from fragments using an origin policy.
pub struct ContentSelector<'a> {
    classifier: &'a dyn OriginClassifier,
}

impl<'a> ContentSelector<'a> {
    /// Creates a selector backed by the given classifier.
    #[must_use]
    pub fn new(classifier: &'a dyn OriginClassifier) -> Self {
        Self { classifier }
    }

    /// Selects a candidate from a single fragment.
    ///
    /// Strings are intermediate content. Objects are classified, then the
    /// first non-empty content field wins. Arrays and other scalars yield
    /// nothing here; see [`ContentSelector::select_all`].
    ///
    /// # Examples
    ///
    /// ```
    /// use reply_normalizer::normalize::{ContentSelector, VocabularyClassifier};
    /// use serde_json::json;
    ///
    /// let classifier = VocabularyClassifier::default();
    /// let selector = ContentSelector::new(&classifier);
    /// let candidate = selector.select(&json!({"output": "Hello"})).unwrap();
    /// assert_eq!(candidate.content, "Hello");
    /// assert!(selector.select(&json!({"type": "begin"})).is_none());
    /// ```
    #[must_use]
    pub fn select(&self, fragment: &Fragment) -> Option<CandidateText> {
        match fragment {
            Value::String(s) => accept(s).map(CandidateText::intermediate),
            Value::Object(_) => {
                let origin = self.classifier.classify(fragment);
                find_content(fragment, 0).map(|content| CandidateText::new(content, origin))
            }
            _ => None,
        }
    }

    /// Selects candidates from a fragment, flattening arrays in order.
    #[must_use]
    pub fn select_all(&self, fragment: &Fragment) -> Vec<CandidateText> {
        let mut out = Vec::new();
        self.collect(fragment, 0, &mut out);
        out
    }

    fn collect(&self, fragment: &Fragment, depth: usize, out: &mut Vec<CandidateText>) {
        match fragment {
            Value::Array(items) if depth < MAX_NESTING => {
                for item in items {
                    self.collect(item, depth + 1, out);
                }
            }
            other => out.extend(self.select(other)),
        }
    }
}

/// Returns the first acceptable content string, following wrappers.
fn find_content(value: &Value, depth: usize) -> Option<&str> {
    let map = value.as_object()?;

    let direct = CONTENT_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find_map(accept);
    if direct.is_some() || depth >= MAX_NESTING {
        return direct;
    }

    NESTED_CONTAINERS
        .iter()
        .filter_map(|field| map.get(*field))
        .find_map(|nested| find_content(nested, depth + 1))
}

/// Rejects empty strings and strings that are themselves JSON structures.
fn accept(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() || looks_like_embedded_json(trimmed) {
        None
    } else {
        Some(s)
    }
}

/// True when the text starts and ends with matching brackets.
#[must_use]
pub fn looks_like_embedded_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Convenience: the origin a selector would assign to a fragment.
#[must_use]
pub fn origin_of(classifier: &dyn OriginClassifier, fragment: &Fragment) -> Option<Origin> {
    fragment.is_object().then(|| classifier.classify(fragment))
}
