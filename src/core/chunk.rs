//! Chunk representation.
//!
//! Chunks are bounded pieces of normalized source text paired with
//! structured metadata. Strategies create them; the post-processing
//! pipeline (overlap, enrichment) is the only mutator afterwards.

use crate::io::{LineIndex, char_count, truncate_graphemes};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;

/// A chunk of Markdown source with its line range and metadata.
///
/// Line numbers are 1-based and inclusive, referring to the normalized
/// source. Metadata is a map from string keys to tagged JSON values
/// (string, integer, float, boolean, or structured sub-mapping); callers
/// must treat it as order-insensitive.
///
/// # Examples
///
/// ```
/// use mdchunk_rs::core::Chunk;
///
/// let chunk = Chunk::new("# Title".to_string(), 1, 1);
/// assert_eq!(chunk.char_count(), 7);
/// assert_eq!(chunk.start_line, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk content (UTF-8, `\n`-normalized).
    pub content: String,

    /// First source line covered by this chunk (1-based, inclusive).
    pub start_line: usize,

    /// Last source line covered by this chunk (1-based, inclusive).
    pub end_line: usize,

    /// Structured metadata attached by strategies and the pipeline.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Chunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `content` - Chunk text.
    /// * `start_line` - First covered line (1-based).
    /// * `end_line` - Last covered line (1-based, inclusive).
    #[must_use]
    pub fn new(content: String, start_line: usize, end_line: usize) -> Self {
        Self {
            content,
            start_line,
            end_line,
            metadata: BTreeMap::new(),
        }
    }

    /// Builds a chunk from a byte range of the normalized source.
    ///
    /// Leading blank lines and trailing whitespace are trimmed and the line
    /// range adjusted to the surviving content. Indentation of the first
    /// content line is preserved. Returns `None` when the span is blank.
    #[must_use]
    pub fn from_span(text: &str, index: &LineIndex, range: Range<usize>) -> Option<Self> {
        let start = range.start.min(text.len());
        let end = range.end.min(text.len());
        if start >= end {
            return None;
        }
        let slice = &text[start..end];

        let first_content = slice.find(|c: char| !c.is_whitespace())?;
        let last_content = slice.rfind(|c: char| !c.is_whitespace())?;

        let start_line = index.line_of(start + first_content);
        let end_line = index.line_of(start + last_content);

        // Keep the first content line's indentation but drop blank lines
        // above it.
        let content_start = index.line_start(start_line).max(start);
        let content = text[content_start..=start + last_content].to_string();

        Some(Self::new(content, start_line, end_line))
    }

    /// Returns the chunk size in Unicode code points.
    ///
    /// This is the character measure used against `max_chunk_size`.
    #[must_use]
    pub fn char_count(&self) -> usize {
        char_count(&self.content)
    }

    /// Checks if the chunk content is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Inserts a metadata entry.
    pub fn set_meta(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    /// Returns a boolean metadata value, or `false` when absent.
    #[must_use]
    pub fn meta_bool(&self, key: &str) -> bool {
        self.metadata.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns a string metadata value if present.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Returns an unsigned integer metadata value if present.
    #[must_use]
    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(Value::as_u64)
    }

    /// Returns a preview of the chunk content, truncated at a grapheme
    /// cluster boundary.
    ///
    /// # Arguments
    ///
    /// * `max_graphemes` - Maximum number of user-perceived characters.
    #[must_use]
    pub fn preview(&self, max_graphemes: usize) -> &str {
        truncate_graphemes(&self.content, max_graphemes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk = Chunk::new("Hello".to_string(), 3, 5);
        assert_eq!(chunk.content, "Hello");
        assert_eq!(chunk.start_line, 3);
        assert_eq!(chunk.end_line, 5);
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn test_chunk_char_count_code_points() {
        let chunk = Chunk::new("héllo 世界".to_string(), 1, 1);
        assert_eq!(chunk.char_count(), 8);
    }

    #[test]
    fn test_from_span_trims_blank_edges() {
        let text = "# T\n\nA.\n\n## S1";
        let index = LineIndex::new(text);
        let chunk = Chunk::from_span(text, &index, 0..9).unwrap();
        assert_eq!(chunk.content, "# T\n\nA.");
        assert_eq!(chunk.start_line, 1);
        assert_eq!(chunk.end_line, 3);
    }

    #[test]
    fn test_from_span_skips_leading_blank_lines() {
        let text = "a\n\n\n  - item\nrest";
        let index = LineIndex::new(text);
        // Span starts at the blank lines before the list item.
        let chunk = Chunk::from_span(text, &index, 2..12).unwrap();
        assert_eq!(chunk.content, "  - item");
        assert_eq!(chunk.start_line, 4);
        assert_eq!(chunk.end_line, 4);
    }

    #[test]
    fn test_from_span_blank_returns_none() {
        let text = "a\n\n\nb";
        let index = LineIndex::new(text);
        assert!(Chunk::from_span(text, &index, 1..3).is_none());
    }

    #[test]
    fn test_from_span_out_of_bounds_clamped() {
        let text = "abc";
        let index = LineIndex::new(text);
        let chunk = Chunk::from_span(text, &index, 0..100).unwrap();
        assert_eq!(chunk.content, "abc");
    }

    #[test]
    fn test_metadata_accessors() {
        let mut chunk = Chunk::new("x".to_string(), 1, 1);
        chunk.set_meta("oversize", true);
        chunk.set_meta("reason", "atomic_block");
        chunk.set_meta("chunk_index", 3);
        assert!(chunk.meta_bool("oversize"));
        assert!(!chunk.meta_bool("missing"));
        assert_eq!(chunk.meta_str("reason"), Some("atomic_block"));
        assert_eq!(chunk.meta_u64("chunk_index"), Some(3));
    }

    #[test]
    fn test_preview() {
        let chunk = Chunk::new("Hello, world!".to_string(), 1, 1);
        assert_eq!(chunk.preview(5), "Hello");
        assert_eq!(chunk.preview(100), "Hello, world!");
    }

    #[test]
    fn test_chunk_serialization() {
        let mut chunk = Chunk::new("test".to_string(), 1, 2);
        chunk.set_meta("strategy", "structural");
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }
}
