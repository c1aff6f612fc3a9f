//! Origin classification policy.
//!
//! Deciding whether a fragment came from the answer-producing stage relies
//! on upstream node naming, which is not a stable contract. The policy sits
//! behind the [`OriginClassifier`] trait so the vocabulary can be swapped
//! without touching extraction or merging.

use crate::core::Origin;
use serde_json::Value;

/// Paths checked, in order, for a node descriptor. The first hit wins.
const DESCRIPTOR_PATHS: &[&[&str]] = &[
    &["metadata", "nodeName"],
    &["nodeName"],
    &["metadata", "node"],
    &["node"],
    &["source"],
];

/// Default vocabulary marking a node as answer-producing.
pub const DEFAULT_FINAL_VOCABULARY: &[&str] =
    &["answer", "response", "respond", "output", "final", "reply"];

/// Trait for origin classification policies.
///
/// # Examples
///
/// ```
/// use reply_normalizer::core::Origin;
/// use reply_normalizer::normalize::{OriginClassifier, VocabularyClassifier};
/// use serde_json::json;
///
/// let classifier = VocabularyClassifier::default();
/// let fragment = json!({"metadata": {"nodeName": "Respond to Webhook"}, "content": "Hi"});
/// assert_eq!(classifier.classify(&fragment), Origin::Final);
/// ```
pub trait OriginClassifier: Send + Sync {
    /// Classifies one parsed object.
    fn classify(&self, fragment: &Value) -> Origin;

    /// Returns the policy name.
    fn name(&self) -> &'static str;
}

/// Finds the node descriptor of a fragment, if any.
///
/// A descriptor is either a string or an object with a string `name`.
#[must_use]
pub fn node_descriptor(fragment: &Value) -> Option<&str> {
    DESCRIPTOR_PATHS.iter().find_map(|path| {
        let found = path
            .iter()
            .try_fold(fragment, |value, key| value.get(key))?;
        match found {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        }
    })
}

/// Classifies by case-insensitive substring match on the node descriptor.
///
/// Fragments without a descriptor are [`Origin::Intermediate`].
#[derive(Debug, Clone)]
pub struct VocabularyClassifier {
    vocabulary: Vec<String>,
}

impl Default for VocabularyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FINAL_VOCABULARY.iter().copied())
    }
}

impl VocabularyClassifier {
    /// Creates a classifier with a custom vocabulary.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

impl OriginClassifier for VocabularyClassifier {
    fn classify(&self, fragment: &Value) -> Origin {
        let Some(descriptor) = node_descriptor(fragment) else {
            return Origin::Intermediate;
        };
        let descriptor = descriptor.to_lowercase();
        if self.vocabulary.iter().any(|w| descriptor.contains(w.as_str())) {
            Origin::Final
        } else {
            Origin::Intermediate
        }
    }

    fn name(&self) -> &'static str {
        "vocabulary"
    }
}

/// Tags everything intermediate, so merging ignores origin entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveClassifier;

impl OriginClassifier for PermissiveClassifier {
    fn classify(&self, _fragment: &Value) -> Origin {
        Origin::Intermediate
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Creates a classifier by name: "vocabulary" or "none".
///
/// # Errors
///
/// Returns [`crate::error::CommandError::InvalidArgument`] for unknown names.
pub fn create_classifier(name: &str) -> crate::error::Result<Box<dyn OriginClassifier>> {
    match name.to_lowercase().as_str() {
        "vocabulary" => Ok(Box::new(VocabularyClassifier::default())),
        "none" => Ok(Box::new(PermissiveClassifier)),
        _ => Err(crate::error::CommandError::InvalidArgument(format!(
            "unknown classifier: {name}"
        ))
        .into()),
    }
}

/// Lists available classifier names.
#[must_use]
pub fn available_classifiers() -> Vec<&'static str> {
    vec!["vocabulary", "none"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"metadata": {"nodeName": "AI Agent"}}), Origin::Intermediate ; "agent node")]
    #[test_case(json!({"metadata": {"nodeName": "Final Answer"}}), Origin::Final ; "final answer node")]
    #[test_case(json!({"nodeName": "Respond to Webhook"}), Origin::Final ; "respond node")]
    #[test_case(json!({"node": {"name": "Format Output"}}), Origin::Final ; "object descriptor")]
    #[test_case(json!({"source": "Vector Store Tool"}), Origin::Intermediate ; "tool source")]
    #[test_case(json!({"output": "text only"}), Origin::Intermediate ; "no descriptor")]
    fn test_vocabulary_classifier(fragment: Value, expected: Origin) {
        assert_eq!(VocabularyClassifier::default().classify(&fragment), expected);
    }

    #[test]
    fn test_first_descriptor_wins() {
        let fragment = json!({
            "metadata": {"nodeName": "Calculator"},
            "nodeName": "Final Answer"
        });
        assert_eq!(node_descriptor(&fragment), Some("Calculator"));
        assert_eq!(
            VocabularyClassifier::default().classify(&fragment),
            Origin::Intermediate
        );
    }

    #[test]
    fn test_blank_descriptor_skipped() {
        let fragment = json!({"metadata": {"nodeName": "  "}, "node": "Reply"});
        assert_eq!(node_descriptor(&fragment), Some("Reply"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let classifier = VocabularyClassifier::new(["Synthesizer", ""]);
        assert_eq!(classifier.classify(&json!({"nodeName": "Agent"})), Origin::Intermediate);
        let fragment = json!({"nodeName": "Tax Synthesizer"});
        assert_eq!(classifier.classify(&fragment), Origin::Final);
        let fragment = json!({"nodeName": "Final Answer"});
        assert_eq!(classifier.classify(&fragment), Origin::Intermediate);
    }

    #[test]
    fn test_permissive_classifier() {
        let fragment = json!({"nodeName": "Final Answer"});
        assert_eq!(PermissiveClassifier.classify(&fragment), Origin::Intermediate);
    }

    #[test]
    fn test_create_classifier() {
        assert_eq!(create_classifier("vocabulary").unwrap().name(), "vocabulary");
        assert_eq!(create_classifier("NONE").unwrap().name(), "none");
        assert!(create_classifier("magic").is_err());
        assert_eq!(available_classifiers().len(), 2);
    }
}
