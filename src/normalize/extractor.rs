//! Balanced-bracket JSON fragment extraction.
//!
//! Scans arbitrary text for `{...}` and `[...]` spans whose brackets
//! balance, then parses each span with `serde_json`. Handles single
//! objects, NDJSON, objects concatenated with no separator, and JSON mixed
//! with surrounding noise. No cursor is kept between calls: running on a
//! longer buffer rediscovers every earlier fragment plus newly completed
//! ones.

use crate::core::Fragment;
use std::ops::Range;

/// Outcome of scanning one span starting at an opening bracket.
enum SpanScan {
    /// Brackets balanced; the span ends (exclusive) at this byte offset.
    Closed(usize),
    /// A closer of the wrong kind at this byte offset.
    Mismatched(usize),
    /// The buffer ended before the brackets balanced.
    Unterminated,
}

/// Returns every JSON value recoverable from `text`, left to right.
///
/// Spans that balance but fail to parse are skipped and scanning resumes
/// after them. A span that never closes is retried from the next line, so a
/// truncated NDJSON line does not hide the lines after it. Only the last
/// unterminated span is left alone; it may complete once more bytes arrive.
///
/// # Examples
///
/// ```
/// use reply_normalizer::normalize::extract_fragments;
///
/// let fragments = extract_fragments(r#"{"type":"begin"}{"output":"Hi"}"#);
/// assert_eq!(fragments.len(), 2);
/// assert_eq!(fragments[1]["output"], "Hi");
/// ```
#[must_use]
pub fn extract_fragments(text: &str) -> Vec<Fragment> {
    extract_spans(text)
        .into_iter()
        .filter_map(|span| match serde_json::from_str::<Fragment>(&text[span.clone()]) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::trace!(start = span.start, end = span.end, error = %e, "skipping unparsable span");
                None
            }
        })
        .collect()
}

/// Returns the byte ranges of all balanced bracket spans in `text`.
///
/// Spans are candidates only; they are not guaranteed to parse.
#[must_use]
pub fn extract_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|b| matches!(b, b'{' | b'[')) {
        let start = pos + offset;
        match scan_span(bytes, start) {
            SpanScan::Closed(end) => {
                spans.push(start..end);
                pos = end;
            }
            SpanScan::Mismatched(at) => pos = at + 1,
            SpanScan::Unterminated => match bytes[start..].iter().position(|&b| b == b'\n') {
                Some(newline) => pos = start + newline + 1,
                None => break,
            },
        }
    }

    spans
}

/// Tracks bracket nesting from `start`, ignoring brackets inside strings.
fn scan_span(bytes: &[u8], start: usize) -> SpanScan {
    let mut expected: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => expected.push(b'}'),
            b'[' => expected.push(b']'),
            b'}' | b']' => {
                if expected.pop() != Some(b) {
                    return SpanScan::Mismatched(i);
                }
                if expected.is_empty() {
                    return SpanScan::Closed(i + 1);
                }
            }
            _ => {}
        }
    }

    SpanScan::Unterminated
}
