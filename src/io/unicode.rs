//! Unicode utilities for text processing.
//!
//! Character counts throughout the crate are Unicode code points, not
//! bytes; previews are truncated at grapheme cluster boundaries so that
//! user-perceived characters are never split.

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
/// use mdchunk_rs::io::find_char_boundary;
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

/// Counts Unicode code points in a string.
///
/// This is the character measure used for chunk sizes, overlap targets,
/// and coverage validation.
#[must_use]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Returns the byte offset after the first `n` code points of `s`, or
/// `s.len()` if `s` has fewer than `n` code points.
#[must_use]
pub fn byte_offset_of_chars(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(pos, _)| pos)
}

/// Truncates a string at a grapheme cluster boundary.
///
/// # Arguments
///
/// * `s` - The string to truncate.
/// * `max_graphemes` - Maximum number of grapheme clusters.
///
/// # Examples
///
/// ```
/// use mdchunk_rs::io::truncate_graphemes;
///
/// assert_eq!(truncate_graphemes("Hello", 3), "Hel");
/// assert_eq!(truncate_graphemes("世界!", 2), "世界");
/// ```
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let mut end_byte = 0;

    for (count, grapheme) in s.graphemes(true).enumerate() {
        if count >= max_graphemes {
            break;
        }
        end_byte += grapheme.len();
    }

    &s[..end_byte]
}

/// Returns the suffix of `s` containing at most `max_chars` code points,
/// starting at a character boundary.
#[must_use]
pub fn tail_chars(s: &str, max_chars: usize) -> &str {
    let total = char_count(s);
    if total <= max_chars {
        return s;
    }
    let start = byte_offset_of_chars(s, total - max_chars);
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_char_boundary() {
        let s = "Hello 世界!";
        assert_eq!(find_char_boundary(s, 0), 0);
        assert_eq!(find_char_boundary(s, 6), 6);
        assert_eq!(find_char_boundary(s, 7), 6);
        assert_eq!(find_char_boundary(s, 8), 6);
        assert_eq!(find_char_boundary(s, 9), 9);
        assert_eq!(find_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_char_count() {
        assert_eq!(char_count("Hello"), 5);
        assert_eq!(char_count("世界"), 2);
        assert_eq!(char_count(""), 0);
    }

    #[test]
    fn test_byte_offset_of_chars() {
        let s = "a世b";
        assert_eq!(byte_offset_of_chars(s, 0), 0);
        assert_eq!(byte_offset_of_chars(s, 1), 1);
        assert_eq!(byte_offset_of_chars(s, 2), 4);
        assert_eq!(byte_offset_of_chars(s, 10), s.len());
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("Hello", 3), "Hel");
        assert_eq!(truncate_graphemes("世界!", 2), "世界");
        assert_eq!(truncate_graphemes("Hello", 10), "Hello");
    }

    #[test]
    fn test_tail_chars() {
        assert_eq!(tail_chars("Hello", 3), "llo");
        assert_eq!(tail_chars("Hello", 10), "Hello");
        assert_eq!(tail_chars("a世b", 2), "世b");
    }
}
