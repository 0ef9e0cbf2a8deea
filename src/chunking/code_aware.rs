//! Code-aware chunking strategy.
//!
//! Handles documents with fenced code and/or tables. The document is
//! segmented into an alternating sequence of atomic spans (top-level
//! fences, tables) and text runs; atomic segments are emitted verbatim as
//! single chunks, text runs go through the recursive splitter, and a
//! short lead-in that introduces a code block is bound to it.

use crate::chunking::splitter::split_range;
use crate::chunking::DocumentView;
use crate::core::{Chunk, ChunkConfig};
use crate::error::Result;

/// Metadata reason recorded on atomic chunks that exceed the size limit.
const OVERSIZE_REASON: &str = "atomic_block";

/// A run of lines, either atomic (never split) or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Inclusive 1-based line range that must stay in one chunk.
    Atomic(usize, usize),
    /// Inclusive 1-based line range splittable at semantic boundaries.
    Text(usize, usize),
}

/// Collects the atomic line spans of a document: every top-level fenced
/// block and every table, ordered by start line.
pub(crate) fn atomic_spans(view: &DocumentView<'_>, config: &ChunkConfig) -> Vec<(usize, usize)> {
    if !config.preserve_atomic_blocks {
        return Vec::new();
    }
    let mut spans: Vec<(usize, usize)> = view
        .fingerprint
        .top_level_fences()
        .map(|b| (b.start_line, b.end_line))
        .chain(
            view.fingerprint
                .tables
                .iter()
                .map(|t| (t.start_line, t.end_line)),
        )
        .collect();
    spans.sort_unstable();
    spans
}

/// Segments an inclusive line range into alternating atomic and text runs.
///
/// Atomic spans outside the range are ignored; ones overlapping its edges
/// are clamped.
pub(crate) fn segment_lines(
    start_line: usize,
    end_line: usize,
    atomic: &[(usize, usize)],
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = start_line;

    for &(s, e) in atomic {
        if e < start_line || s > end_line {
            continue;
        }
        let s = s.max(start_line);
        let e = e.min(end_line);
        if s > cursor {
            segments.push(Segment::Text(cursor, s - 1));
        }
        segments.push(Segment::Atomic(s, e));
        cursor = e + 1;
    }
    if cursor <= end_line {
        segments.push(Segment::Text(cursor, end_line));
    }

    segments
}

/// Emits chunks for a line range, honoring the atomic spans inside it.
///
/// Used by this strategy for the whole document and by the structural
/// strategy for oversized leaf sections.
pub(crate) fn chunk_segments(
    view: &DocumentView<'_>,
    config: &ChunkConfig,
    start_line: usize,
    end_line: usize,
    atomic: &[(usize, usize)],
) -> Vec<(bool, Chunk)> {
    let mut out = Vec::new();

    for segment in segment_lines(start_line, end_line, atomic) {
        match segment {
            Segment::Atomic(s, e) => {
                if let Some(mut chunk) = Chunk::from_span(view.text, view.index, view.index.span(s, e))
                {
                    if chunk.char_count() > config.max_chunk_size {
                        chunk.set_meta("oversize", true);
                        chunk.set_meta("reason", OVERSIZE_REASON);
                    }
                    out.push((true, chunk));
                }
            }
            Segment::Text(s, e) => {
                let range = view.index.span(s, e);
                for piece in split_range(view.text, range, config.max_chunk_size) {
                    if let Some(chunk) = Chunk::from_span(view.text, view.index, piece) {
                        out.push((false, chunk));
                    }
                }
            }
        }
    }

    out
}

/// The code-aware strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeAwareStrategy;

impl CodeAwareStrategy {
    /// Chunks a document, keeping fenced code and tables atomic.
    ///
    /// # Errors
    ///
    /// This strategy itself does not fail; the `Result` is part of the
    /// common strategy contract consumed by the fallback chain.
    pub fn apply(view: &DocumentView<'_>, config: &ChunkConfig) -> Result<Vec<Chunk>> {
        let atomic = atomic_spans(view, config);
        let total_lines = view.fingerprint.total_lines;
        if total_lines == 0 {
            return Ok(Vec::new());
        }

        let chunks = chunk_segments(view, config, 1, total_lines, &atomic);
        Ok(bind_context(chunks, config))
    }
}

/// Merges a short introductory text chunk into the atomic chunk it
/// precedes.
///
/// The lead-in qualifies when it is under a quarter of the size limit,
/// spans at most three prose lines, and ends with a colon or without
/// terminal punctuation. The merge is skipped when the combined chunk
/// would exceed one and a half times the size limit.
fn bind_context(chunks: Vec<(bool, Chunk)>, config: &ChunkConfig) -> Vec<Chunk> {
    let mut out: Vec<(bool, Chunk)> = Vec::with_capacity(chunks.len());

    for (is_atomic, chunk) in chunks {
        let bind = is_atomic
            && out
                .last()
                .is_some_and(|(prev_atomic, prev)| !prev_atomic && binds_forward(prev, config));
        let combined_fits = out.last().is_some_and(|(_, prev)| {
            prev.char_count() + 2 + chunk.char_count() <= config.max_chunk_size * 3 / 2
        });

        if bind && combined_fits {
            if let Some((_, prev)) = out.pop() {
                let mut merged = Chunk::new(
                    format!("{}\n\n{}", prev.content, chunk.content),
                    prev.start_line,
                    chunk.end_line,
                );
                merged.metadata = chunk.metadata;
                out.push((true, merged));
                continue;
            }
        }
        out.push((is_atomic, chunk));
    }

    out.into_iter().map(|(_, c)| c).collect()
}

/// Whether a text chunk reads as an introduction to what follows.
fn binds_forward(chunk: &Chunk, config: &ChunkConfig) -> bool {
    if chunk.char_count() >= config.max_chunk_size / 4 {
        return false;
    }
    let prose_lines = chunk
        .content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count();
    if prose_lines > 3 {
        return false;
    }
    match chunk.content.trim_end().chars().last() {
        Some(':') => true,
        Some(c) => !matches!(c, '.' | '!' | '?'),
        None => false,
    }
}
