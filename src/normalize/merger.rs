//! Candidate deduplication and merging.
//!
//! Streaming upstreams resend their growing answer, so the candidate set is
//! full of prefixes and partial copies of the same text. Containment-based
//! deduplication collapses those into the longest version seen. This is a
//! best-effort heuristic: two unrelated strings where one happens to be a
//! substring of the other are also collapsed.

use crate::core::CandidateText;
use crate::normalize::noise::{filter_noise, trim_residue};
use regex::Regex;
use std::sync::OnceLock;

/// Default minimum length (in chars) below which a fragment may be dropped.
pub const DEFAULT_MIN_FRAGMENT_CHARS: usize = 24;

/// Default length ratio that makes a short fragment droppable.
pub const DEFAULT_SHORT_FRAGMENT_RATIO: usize = 4;

/// Default separator between surviving fragments.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Internal identifiers that leak into answers, removed as whole words.
const TECHNICAL_TERMS: &[&str] = &[
    "intermediateSteps",
    "toolCalls",
    "toolCall",
    "tool_calls",
    "executionId",
    "nodeExecuteBefore",
    "nodeExecuteAfter",
    "runIndex",
    "itemIndex",
    "sessionId",
];

/// Tunables for merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    /// Fragments shorter than this (in chars) are candidates for dropping.
    pub min_fragment_chars: usize,
    /// A short fragment is dropped only if the longest survivor is at least
    /// this many times longer.
    pub short_fragment_ratio: usize,
    /// Separator used to join survivors.
    pub separator: String,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            min_fragment_chars: DEFAULT_MIN_FRAGMENT_CHARS,
            short_fragment_ratio: DEFAULT_SHORT_FRAGMENT_RATIO,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl MergePolicy {
    /// Sets the minimum fragment length.
    #[must_use]
    pub const fn min_fragment_chars(mut self, chars: usize) -> Self {
        self.min_fragment_chars = chars;
        self
    }

    /// Sets the short fragment ratio.
    #[must_use]
    pub const fn short_fragment_ratio(mut self, ratio: usize) -> Self {
        self.short_fragment_ratio = ratio;
        self
    }

    /// Sets the join separator.
    #[must_use]
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }
}

/// A cleaned, distinct fragment with its emission position.
#[derive(Debug)]
struct Survivor {
    text: String,
    chars: usize,
    first_seen: usize,
}

/// Merges candidates into a single best answer.
///
/// Returns an empty string when nothing usable remains.
///
/// # Examples
///
/// ```
/// use reply_normalizer::core::CandidateText;
/// use reply_normalizer::normalize::{merge_candidates, MergePolicy};
///
/// let candidates = vec![
///     CandidateText::intermediate("Lagos"),
///     CandidateText::intermediate("Lagos state income tax"),
/// ];
/// assert_eq!(merge_candidates(&candidates, &MergePolicy::default()), "Lagos state income tax");
/// ```
#[must_use]
pub fn merge_candidates(candidates: &[CandidateText], policy: &MergePolicy) -> String {
    let cleaned: Vec<(usize, String, bool)> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, filter_noise(&c.content), c.origin.is_final()))
        .filter(|(_, text, _)| !text.is_empty())
        .collect();

    let any_final = cleaned.iter().any(|(_, _, is_final)| *is_final);
    let working: Vec<(usize, String)> = cleaned
        .into_iter()
        .filter(|(_, _, is_final)| !any_final || *is_final)
        .map(|(i, text, _)| (i, text))
        .collect();

    let mut survivors = dedup_by_containment(working);
    drop_short_fragments(&mut survivors, policy);
    survivors.sort_by_key(|s| s.first_seen);

    let joined = survivors
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(&policy.separator);
    strip_technical_terms(&joined)
}

/// Keeps the longest distinct strings, dropping any contained in a kept one.
///
/// A kept string inherits the earliest position of anything it absorbed.
fn dedup_by_containment(mut working: Vec<(usize, String)>) -> Vec<Survivor> {
    // Stable sort: equal lengths keep emission order.
    working.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut kept: Vec<Survivor> = Vec::new();
    for (index, text) in working {
        if let Some(owner) = kept.iter_mut().find(|k| k.text.contains(text.as_str())) {
            owner.first_seen = owner.first_seen.min(index);
            continue;
        }
        kept.push(Survivor {
            chars: text.chars().count(),
            text,
            first_seen: index,
        });
    }
    kept
}

fn drop_short_fragments(survivors: &mut Vec<Survivor>, policy: &MergePolicy) {
    let Some(longest) = survivors.iter().map(|s| s.chars).max() else {
        return;
    };
    survivors.retain(|s| {
        s.chars >= policy.min_fragment_chars
            || longest < s.chars.saturating_mul(policy.short_fragment_ratio)
    });
}

#[allow(clippy::expect_used)]
fn technical_terms() -> &'static Regex {
    static TERMS: OnceLock<Regex> = OnceLock::new();
    TERMS.get_or_init(|| {
        let alternation = TECHNICAL_TERMS.join("|");
        Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid regex")
    })
}

/// Removes leaked internal identifiers from the merged text.
#[must_use]
pub fn strip_technical_terms(text: &str) -> String {
    if !technical_terms().is_match(text) {
        return text.to_string();
    }
    let stripped = technical_terms().replace_all(text, "");
    let collapsed = stripped
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    trim_residue(&collapsed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CandidateText;

    fn merge(candidates: &[CandidateText]) -> String {
        merge_candidates(candidates, &MergePolicy::default())
    }

    #[test]
    fn test_prefix_growth_collapses() {
        let candidates = vec![
            CandidateText::intermediate("Lagos"),
            CandidateText::intermediate("Lagos state income tax"),
        ];
        assert_eq!(merge(&candidates), "Lagos state income tax");
    }

    #[test]
    fn test_streaming_resends_collapse() {
        let candidates = vec![
            CandidateText::final_answer("The VAT"),
            CandidateText::final_answer("The VAT rate in Nigeria"),
            CandidateText::final_answer("The VAT rate in Nigeria is 7.5%."),
            CandidateText::final_answer("The VAT rate in Nigeria"),
        ];
        assert_eq!(merge(&candidates), "The VAT rate in Nigeria is 7.5%.");
    }

    #[test]
    fn test_final_origin_wins() {
        let candidates = vec![
            CandidateText::intermediate("Searching the tax code for the Lagos income tax bands"),
            CandidateText::final_answer("Lagos uses graduated personal income tax bands."),
        ];
        assert_eq!(
            merge(&candidates),
            "Lagos uses graduated personal income tax bands."
        );
    }

    #[test]
    fn test_all_intermediate_used_when_no_final() {
        let candidates = vec![
            CandidateText::intermediate("Company income tax is 30% for large companies."),
            CandidateText::intermediate("Small companies with turnover under N25m pay 0%."),
        ];
        assert_eq!(
            merge(&candidates),
            "Company income tax is 30% for large companies.\n\nSmall companies with turnover under N25m pay 0%."
        );
    }

    #[test]
    fn test_emission_order_uses_earliest_absorbed() {
        let candidates = vec![
            CandidateText::intermediate("Withholding tax applies to dividends"),
            CandidateText::intermediate("Stamp duties apply to receipts above N10,000."),
            CandidateText::intermediate("Withholding tax applies to dividends at 10%."),
        ];
        assert_eq!(
            merge(&candidates),
            "Withholding tax applies to dividends at 10%.\n\nStamp duties apply to receipts above N10,000."
        );
    }

    #[test]
    fn test_short_labels_dropped_next_to_long_text() {
        let candidates = vec![
            CandidateText::intermediate("Tax Agent"),
            CandidateText::intermediate(
                "Capital gains tax in Nigeria is charged at 10% on chargeable gains from asset disposals.",
            ),
        ];
        assert_eq!(
            merge(&candidates),
            "Capital gains tax in Nigeria is charged at 10% on chargeable gains from asset disposals."
        );
    }

    #[test]
    fn test_short_fragments_kept_without_long_neighbour() {
        let candidates = vec![
            CandidateText::intermediate("Yes."),
            CandidateText::intermediate("It is 7.5%."),
        ];
        assert_eq!(merge(&candidates), "Yes.\n\nIt is 7.5%.");
    }

    #[test]
    fn test_noise_cleaned_before_dedup() {
        let candidates = vec![
            CandidateText::final_answer("Thought: answer directly\nVAT is 7.5%."),
            CandidateText::final_answer("VAT is 7.5%."),
            CandidateText::final_answer("Observation: nothing"),
        ];
        assert_eq!(merge(&candidates), "VAT is 7.5%.");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(merge(&[]), "");
        assert_eq!(merge(&[CandidateText::final_answer("  ")]), "");
    }

    #[test]
    fn test_technical_terms_stripped() {
        assert_eq!(
            strip_technical_terms("See intermediateSteps for the rate: 7.5%."),
            "See for the rate: 7.5%."
        );
        assert_eq!(strip_technical_terms("toolCall"), "");
        assert_eq!(strip_technical_terms("plain text"), "plain text");
    }

    #[test]
    fn test_custom_policy() {
        let policy = MergePolicy::default()
            .separator(" | ")
            .min_fragment_chars(0)
            .short_fragment_ratio(2);
        let candidates = vec![
            CandidateText::intermediate("one"),
            CandidateText::intermediate("two"),
        ];
        assert_eq!(merge_candidates(&candidates, &policy), "one | two");
    }
}
