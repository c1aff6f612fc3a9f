//! Noise filtering for agent trace text.
//!
//! Removes tool-call traces, reasoning markers, internal node labels and
//! identifiers from raw text, independent of any JSON structure. Passes are
//! repeated until the text stops changing, so the filter is idempotent.

use regex::Regex;
use std::sync::OnceLock;

/// Bracket and quote pairs that may be left wrapping the text.
const PAIRS: &[(char, char)] = &[('[', ']'), ('{', '}'), ('"', '"'), ('`', '`')];

/// Removal patterns, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoisePattern {
    /// `Calling <tool> with input: ...` to end of line.
    ToolInvocation,
    /// `Thought:`, `Action:`, `Observation:` and similar, to end of line.
    ReasoningMarker,
    /// `[AI Agent]`, `[Vector Store Tool]` and other internal node labels.
    NodeLabel,
    /// UUID-shaped identifiers.
    Identifier,
}

impl NoisePattern {
    /// All patterns in application order.
    pub const ALL: [Self; 4] = [
        Self::ToolInvocation,
        Self::ReasoningMarker,
        Self::NodeLabel,
        Self::Identifier,
    ];

    /// Returns the compiled regex for this pattern.
    #[allow(clippy::expect_used)]
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::ToolInvocation => static_regex!(
                TOOL_INVOCATION,
                r"(?i)calling\s+[\w .\-]+?\s+with\s+input\s*:[^\n]*"
            ),
            Self::ReasoningMarker => static_regex!(
                REASONING_MARKER,
                r"\b(?:Thought|Action Input|Action|Observation|Scenario|Keywords|Reasoning|Tool Call|Tool Input)\s*:[^\n]*"
            ),
            Self::NodeLabel => static_regex!(
                NODE_LABEL,
                r"\[\s*[\w .\-]*?(?:Agent|Tool|Vector Store|Embeddings|Chat Model|Memory|Retriever|Chain|Node|Workflow|Webhook)[\w .\-:]*\]"
            ),
            Self::Identifier => static_regex!(
                IDENTIFIER,
                r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b"
            ),
        }
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ToolInvocation => "tool-invocation",
            Self::ReasoningMarker => "reasoning-marker",
            Self::NodeLabel => "node-label",
            Self::Identifier => "identifier",
        }
    }

    /// Returns true if the pattern occurs in `text`.
    #[must_use]
    pub fn is_match(self, text: &str) -> bool {
        self.regex().is_match(text)
    }
}

#[allow(clippy::expect_used)]
fn horizontal_runs() -> &'static Regex {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    RUNS.get_or_init(|| Regex::new(r"[ \t]{2,}").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn trailing_spaces() -> &'static Regex {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    TRAILING.get_or_init(|| Regex::new(r"(?m)[ \t]+$").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn blank_runs() -> &'static Regex {
    static BLANKS: OnceLock<Regex> = OnceLock::new();
    BLANKS.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Strips known non-content patterns from `text`.
///
/// Legitimate prose that matches no pattern passes through unchanged apart
/// from surrounding whitespace.
///
/// # Examples
///
/// ```
/// use reply_normalizer::normalize::filter_noise;
///
/// let raw = "Thought: look up the rate\nThe VAT rate is 7.5%.";
/// assert_eq!(filter_noise(raw), "The VAT rate is 7.5%.");
/// ```
#[must_use]
pub fn filter_noise(text: &str) -> String {
    let mut current = single_pass(text);
    loop {
        // A pass that changes the text makes it shorter.
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn single_pass(text: &str) -> String {
    let mut cleaned = text.replace("\r\n", "\n");
    for pattern in NoisePattern::ALL {
        if pattern.is_match(&cleaned) {
            cleaned = pattern.regex().replace_all(&cleaned, "").into_owned();
        }
    }

    let cleaned = horizontal_runs().replace_all(&cleaned, " ");
    let cleaned = trailing_spaces().replace_all(&cleaned, "");
    let cleaned = blank_runs().replace_all(&cleaned, "\n\n");
    trim_residue(&cleaned).to_string()
}

/// Trims whitespace and unbalanced residue from both ends.
///
/// A bracket, quote, pipe or separator at an edge is removed only when it
/// has no partner in the text, or when one pair wraps the whole text and
/// occurs nowhere else. Balanced markup such as a markdown table or a
/// leading quoted word is kept.
#[must_use]
pub fn trim_residue(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = trim_unbalanced_edges(current).trim();
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn trim_unbalanced_edges(text: &str) -> &str {
    if let Some(inner) = strip_wrapping_pair(text) {
        return inner;
    }

    let mut text = text;
    if let Some(first) = text.chars().next()
        && is_lone_leading(text, first)
    {
        text = &text[first.len_utf8()..];
    }
    if let Some(last) = text.chars().next_back()
        && is_lone_trailing(text, last)
    {
        text = &text[..text.len() - last.len_utf8()];
    }
    text
}

/// Strips a pair that encloses the text and appears nowhere inside it.
fn strip_wrapping_pair(text: &str) -> Option<&str> {
    PAIRS.iter().find_map(|&(open, close)| {
        let inner = text.strip_prefix(open)?.strip_suffix(close)?;
        (!inner.contains([open, close])).then_some(inner)
    })
}

fn is_lone_leading(text: &str, c: char) -> bool {
    match c {
        ',' | ';' | ':' | ']' | '}' => true,
        '[' => count(text, '[') > count(text, ']'),
        '{' => count(text, '{') > count(text, '}'),
        '"' | '`' => !count(text, c).is_multiple_of(2),
        '|' => text.lines().next().is_some_and(|line| count(line, '|') == 1),
        _ => false,
    }
}

fn is_lone_trailing(text: &str, c: char) -> bool {
    match c {
        ',' | ';' | '[' | '{' => true,
        ']' => count(text, ']') > count(text, '['),
        '}' => count(text, '}') > count(text, '{'),
        '"' | '`' => !count(text, c).is_multiple_of(2),
        '|' => text.lines().next_back().is_some_and(|line| count(line, '|') == 1),
        _ => false,
    }
}

fn count(text: &str, c: char) -> usize {
    text.matches(c).count()
}
