//! Unicode utilities for text reveal.
//!
//! Reveal progress is measured in grapheme clusters so that a combined
//! emoji or an accented letter is never shown half-drawn.

use unicode_segmentation::UnicodeSegmentation;

/// Finds a valid UTF-8 character boundary at or before the given position.
///
/// # Arguments
///
/// * `s` - The string to search.
/// * `pos` - Target position in bytes.
///
/// # Examples
///
/// ```
/// use reply_normalizer::io::find_char_boundary;
///
/// let s = "Hello 世界";
/// assert_eq!(find_char_boundary(s, 6), 6); // Before '世'
/// assert_eq!(find_char_boundary(s, 7), 6); // Middle of '世', backs up
/// ```
#[must_use]
pub const fn find_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut boundary = pos;
    // UTF-8 continuation bytes start with 10xxxxxx (0x80-0xBF)
    while boundary > 0 && (bytes[boundary] & 0xC0) == 0x80 {
        boundary -= 1;
    }
    boundary
}

/// Counts the number of grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use reply_normalizer::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("₦500"), 4);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Returns the byte offset reached by advancing `n` grapheme clusters
/// from byte offset `from`.
///
/// `from` is first moved back to a character boundary. The result never
/// exceeds `s.len()`.
#[must_use]
pub fn advance_graphemes(s: &str, from: usize, n: usize) -> usize {
    let start = find_char_boundary(s, from);
    let mut end = start;
    for grapheme in s[start..].graphemes(true).take(n) {
        end += grapheme.len();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_char_boundary() {
        let s = "Hello 世界!";
        assert_eq!(find_char_boundary(s, 0), 0);
        assert_eq!(find_char_boundary(s, 5), 5);
        assert_eq!(find_char_boundary(s, 6), 6); // Space before '世'
        assert_eq!(find_char_boundary(s, 7), 6); // Middle of '世'
        assert_eq!(find_char_boundary(s, 8), 6); // Still in '世'
        assert_eq!(find_char_boundary(s, 9), 9); // After '世'
        assert_eq!(find_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_grapheme_count() {
        assert_eq!(grapheme_count("Hello"), 5);
        assert_eq!(grapheme_count("世界"), 2);
        assert_eq!(grapheme_count(""), 0);
        assert_eq!(grapheme_count("e\u{301}"), 1);
    }

    #[test]
    fn test_advance_graphemes() {
        let s = "ab世界";
        assert_eq!(advance_graphemes(s, 0, 1), 1);
        assert_eq!(advance_graphemes(s, 0, 3), 5);
        assert_eq!(advance_graphemes(s, 2, 1), 5);
        assert_eq!(advance_graphemes(s, 0, 100), s.len());
        // Mid-character start backs up first
        assert_eq!(advance_graphemes(s, 3, 1), 5);
    }

    #[test]
    fn test_advance_keeps_combining_marks_together() {
        let s = "e\u{301}x";
        assert_eq!(advance_graphemes(s, 0, 1), 3);
    }
}
