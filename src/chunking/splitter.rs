//! Recursive text splitter.
//!
//! Splits a non-atomic span that exceeds the size limit, trying boundary
//! types from most to least semantic: blank line, header line, sentence
//! end, line break, word break, and finally a hard character cut. Within
//! each level the latest boundary before the size limit wins; when a level
//! finds nothing, the splitter descends to the next.

use crate::io::{byte_offset_of_chars, find_char_boundary};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Sentence-end boundary: terminal punctuation followed by whitespace.
///
/// Shared with the overlap applier, which walks the same boundaries
/// backwards.
pub(crate) fn sentence_end_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("valid regex"))
}

fn header_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^#{1,6}\s+\S").expect("valid regex"))
}

/// Splits a byte range of normalized text into pieces of at most
/// `max_chars` code points each.
///
/// The returned ranges partition the input range in order. Only the
/// character-cut level can be reached with no boundary at all, so every
/// piece respects `max_chars`.
#[must_use]
pub fn split_range(text: &str, range: Range<usize>, max_chars: usize) -> Vec<Range<usize>> {
    let start = find_char_boundary(text, range.start.min(text.len()));
    let end = find_char_boundary(text, range.end.min(text.len()));
    let max_chars = max_chars.max(1);

    let mut pieces = Vec::new();
    let mut pos = start;

    while pos < end {
        let window_end = pos + byte_offset_of_chars(&text[pos..end], max_chars);
        if window_end >= end {
            pieces.push(pos..end);
            break;
        }

        let cut = find_cut(text, pos, window_end);
        let cut = if cut <= pos { window_end } else { cut };
        pieces.push(pos..cut);
        pos = cut;
    }

    pieces
}

/// Finds the latest boundary in `(pos, window_end]`, descending through
/// boundary levels until one matches.
fn find_cut(text: &str, pos: usize, window_end: usize) -> usize {
    let window = &text[pos..window_end];

    // Level 1: blank line. Cut after the separator so the break stays
    // with neither piece.
    if let Some(idx) = window.rfind("\n\n") {
        return pos + idx + 2;
    }

    // Level 2: header line. Cut before the last header start.
    if let Some(idx) = last_header_start(text, pos, window_end) {
        return idx;
    }

    // Level 3: sentence end.
    if let Some(m) = sentence_end_pattern().find_iter(window).last() {
        return pos + m.end();
    }

    // Level 4: line boundary.
    if let Some(idx) = window.rfind('\n') {
        return pos + idx + 1;
    }

    // Level 5: word boundary.
    if let Some((idx, c)) = window.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        return pos + idx + c.len_utf8();
    }

    // Level 6: hard character cut.
    window_end
}

/// Returns the byte offset of the start of the last header line within
/// the window, excluding a header right at `pos`.
fn last_header_start(text: &str, pos: usize, window_end: usize) -> Option<usize> {
    let window = &text[pos..window_end];
    let mut candidate = None;

    for (idx, _) in window.match_indices('\n') {
        let line_start = pos + idx + 1;
        if line_start >= window_end {
            break;
        }
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |n| line_start + n);
        if header_line_pattern().is_match(&text[line_start..line_end]) {
            candidate = Some(line_start);
        }
    }

    candidate
}
