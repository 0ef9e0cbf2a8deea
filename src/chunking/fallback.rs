//! Universal fallback strategy.
//!
//! Splits the source into paragraphs and greedily packs them into chunks.
//! A paragraph over the size limit cascades through sentence, word, and
//! finally character splitting, so this strategy never fails and never
//! returns empty output for non-blank input.

use crate::chunking::splitter::split_range;
use crate::chunking::DocumentView;
use crate::core::{Chunk, ChunkConfig};
use crate::error::Result;
use crate::io::char_count;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn paragraph_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{2,}").expect("valid regex"))
}

/// The fallback strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackStrategy;

impl FallbackStrategy {
    /// Chunks a document by paragraph packing.
    ///
    /// # Errors
    ///
    /// This strategy does not fail; the `Result` is part of the common
    /// strategy contract consumed by the fallback chain.
    pub fn apply(view: &DocumentView<'_>, config: &ChunkConfig) -> Result<Vec<Chunk>> {
        let text = view.text;
        let max = config.max_chunk_size;
        let mut chunks = Vec::new();

        // Accumulated source span and its size in code points.
        let mut acc: Option<(Range<usize>, usize)> = None;

        for para in paragraph_ranges(text) {
            let para_chars = char_count(&text[para.clone()]);

            if para_chars > max {
                if let Some((range, _)) = acc.take() {
                    push_span(view, range, &mut chunks);
                }
                for piece in split_range(text, para, max) {
                    push_span(view, piece, &mut chunks);
                }
                continue;
            }

            acc = Some(match acc.take() {
                None => (para.clone(), para_chars),
                Some((range, chars)) => {
                    // Separator chars between the accumulated span and
                    // this paragraph count toward the limit.
                    let bridge = char_count(&text[range.end..para.end]);
                    if chars + bridge <= max {
                        (range.start..para.end, chars + bridge)
                    } else {
                        push_span(view, range, &mut chunks);
                        (para.clone(), para_chars)
                    }
                }
            });
        }

        if let Some((range, _)) = acc {
            push_span(view, range, &mut chunks);
        }

        Ok(chunks)
    }
}

fn push_span(view: &DocumentView<'_>, range: Range<usize>, out: &mut Vec<Chunk>) {
    if let Some(chunk) = Chunk::from_span(view.text, view.index, range) {
        out.push(chunk);
    }
}

/// Byte ranges of paragraphs: maximal runs separated by two or more
/// consecutive newlines. Blank-only runs are skipped.
fn paragraph_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for sep in paragraph_break_pattern().find_iter(text) {
        if start < sep.start() {
            ranges.push(start..sep.start());
        }
        start = sep.end();
    }
    if start < text.len() {
        ranges.push(start..text.len());
    }

    ranges
        .into_iter()
        .filter(|r| !text[r.clone()].trim().is_empty())
        .collect()
}
