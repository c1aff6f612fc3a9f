//! Response normalization pipeline.
//!
//! Turns a raw, possibly partial response body into the current best answer:
//!
//! - **Extractor**: recovers balanced JSON fragments from noisy text
//! - **Selector**: pulls content out of each fragment and tags its origin
//! - **Classifier**: the pluggable policy deciding final vs intermediate origin
//! - **Noise filter**: strips agent traces and identifiers from text
//! - **Merger**: deduplicates overlapping candidates into one answer
//!
//! The whole buffer is re-processed on every call; no parse state is carried
//! between chunks.

pub mod classifier;
pub mod extractor;
pub mod merger;
pub mod noise;
pub mod selector;

pub use classifier::{
    OriginClassifier, PermissiveClassifier, VocabularyClassifier, available_classifiers,
    create_classifier,
};
pub use extractor::{extract_fragments, extract_spans};
pub use merger::{MergePolicy, merge_candidates};
pub use noise::{NoisePattern, filter_noise};
pub use selector::{ContentSelector, looks_like_embedded_json};

use crate::core::{CandidateText, Fragment, Origin};
use serde_json::Value;
use serde::Serialize;

/// Answer returned when nothing usable could be extracted.
pub const FALLBACK_ANSWER: &str = "The AI sent a response but no content could be extracted.";

/// Which pass over the buffer is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mid-stream snapshot. A buffer that starts like JSON but has not yet
    /// produced a fragment is treated as pending rather than as text.
    Incremental,
    /// Authoritative end-of-stream pass.
    Final,
}

/// Diagnostic view of one normalization pass.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeReport {
    /// Number of JSON fragments recovered.
    pub fragment_count: usize,
    /// Origins of recovered object fragments, in order.
    pub fragment_origins: Vec<Option<Origin>>,
    /// Whether the raw-text fallback produced the candidates.
    pub raw_text: bool,
    /// Candidates passed to the merger.
    pub candidates: Vec<CandidateText>,
    /// Merged answer (empty when nothing usable was found).
    pub answer: String,
}

/// Runs extraction, selection, filtering and merging over a buffer snapshot.
///
/// # Examples
///
/// ```
/// use reply_normalizer::normalize::Normalizer;
///
/// let normalizer = Normalizer::default();
/// let body = r#"{"type":"begin"}{"output":"The VAT rate in Nigeria is 7.5%."}"#;
/// assert_eq!(normalizer.finalize(body), "The VAT rate in Nigeria is 7.5%.");
/// ```
pub struct Normalizer {
    classifier: Box<dyn OriginClassifier>,
    policy: MergePolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Box::new(VocabularyClassifier::default()), MergePolicy::default())
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("classifier", &self.classifier.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Normalizer {
    /// Creates a normalizer with the given origin policy and merge tunables.
    #[must_use]
    pub fn new(classifier: Box<dyn OriginClassifier>, policy: MergePolicy) -> Self {
        Self { classifier, policy }
    }

    /// Returns the classifier name.
    #[must_use]
    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Collects candidates from the buffer.
    ///
    /// Returns the candidates and whether the raw-text fallback was used.
    ///
    /// Raw text is used when the fragments yield no candidates and none of
    /// them is an object. Bracketed prose such as a `[1]` citation parses as
    /// JSON but does not make the body structured.
    #[must_use]
    pub fn candidates(&self, buffer: &str, phase: Phase) -> (Vec<CandidateText>, bool) {
        let fragments = extract_fragments(buffer);
        let selector = ContentSelector::new(self.classifier.as_ref());
        let candidates: Vec<CandidateText> = fragments
            .iter()
            .flat_map(|fragment| selector.select_all(fragment))
            .collect();

        if candidates.is_empty() && !fragments.iter().any(is_structured) {
            return (raw_text_candidate(buffer, phase).into_iter().collect(), true);
        }
        (candidates, false)
    }

    /// Computes the current best answer, or an empty string if none yet.
    #[must_use]
    pub fn best_answer(&self, buffer: &str, phase: Phase) -> String {
        let (candidates, _) = self.candidates(buffer, phase);
        merge_candidates(&candidates, &self.policy)
    }

    /// Computes the authoritative answer, substituting [`FALLBACK_ANSWER`]
    /// when nothing usable remains.
    #[must_use]
    pub fn finalize(&self, buffer: &str) -> String {
        let answer = self.best_answer(buffer, Phase::Final);
        if answer.is_empty() {
            tracing::warn!(
                buffer_len = buffer.len(),
                "no usable content in response, using fallback answer"
            );
            FALLBACK_ANSWER.to_string()
        } else {
            answer
        }
    }

    /// Runs a final pass and returns every intermediate result.
    #[must_use]
    pub fn inspect(&self, buffer: &str) -> NormalizeReport {
        let fragments = extract_fragments(buffer);
        let fragment_origins = fragments
            .iter()
            .map(|f| selector::origin_of(self.classifier.as_ref(), f))
            .collect();
        let (candidates, raw_text) = self.candidates(buffer, Phase::Final);
        let answer = merge_candidates(&candidates, &self.policy);
        NormalizeReport {
            fragment_count: fragments.len(),
            fragment_origins,
            raw_text,
            candidates,
            answer,
        }
    }
}

/// True for objects and for arrays holding an object at any depth.
fn is_structured(fragment: &Fragment) -> bool {
    match fragment {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(is_structured),
        _ => false,
    }
}

/// Wraps the whole buffer as a candidate when no structured JSON was found.
fn raw_text_candidate(buffer: &str, phase: Phase) -> Option<CandidateText> {
    let trimmed = buffer.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if phase == Phase::Incremental && trimmed.starts_with(['{', '[']) {
        return None;
    }
    Some(CandidateText::intermediate(buffer))
}
