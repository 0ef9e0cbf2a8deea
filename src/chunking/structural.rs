//! Structural chunking strategy.
//!
//! Handles header-organized documents: the source is split into sections
//! at the configured boundary header level, oversized sections subdivide
//! by the next deeper header level, and every chunk carries the ordered
//! list of its ancestor header texts as `header_path` metadata.

use crate::analyzer::Header;
use crate::chunking::code_aware::{atomic_spans, chunk_segments};
use crate::chunking::DocumentView;
use crate::core::{Chunk, ChunkConfig};
use crate::error::{ChunkingError, Result};
use crate::io::char_count;
use serde_json::Value;

/// The structural strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStrategy;

impl StructuralStrategy {
    /// Chunks a document along its header hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkingError::StrategyFailed`] for documents without
    /// headers; the fallback chain then moves on.
    pub fn apply(view: &DocumentView<'_>, config: &ChunkConfig) -> Result<Vec<Chunk>> {
        let headers = &view.fingerprint.headers;
        if headers.is_empty() {
            return Err(ChunkingError::StrategyFailed {
                strategy: "structural",
                reason: "document has no headers".to_string(),
            }
            .into());
        }

        let paths = header_paths(headers);
        let atomic = atomic_spans(view, config);
        let total_lines = view.fingerprint.total_lines;

        let boundary: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.level <= config.section_boundary_level)
            .map(|(i, _)| i)
            .collect();

        // (start_line, end_line, owning header index)
        let mut sections: Vec<(usize, usize, Option<usize>)> = Vec::new();

        let first_boundary_line = boundary.first().map(|&i| headers[i].line);
        let leading = first_boundary_line
            .map_or(Some((1, total_lines)), |line| {
                (line > 1).then(|| (1, line - 1))
            });

        if let Some((start, end)) = leading {
            sections.push((start, end, None));
        }
        for (k, &hi) in boundary.iter().enumerate() {
            let start = headers[hi].line;
            let end = boundary
                .get(k + 1)
                .map_or(total_lines, |&next| headers[next].line - 1);
            sections.push((start, end, Some(hi)));
        }

        // Without preamble extraction the lead-in joins the first
        // boundary section instead of standing alone.
        if !config.extract_preamble
            && sections.len() > 1
            && sections[0].2.is_none()
            && first_boundary_line.is_some()
        {
            let (_, _, hidx) = sections[1];
            let end = sections[1].1;
            sections.splice(0..2, [(1, end, hidx)]);
        }

        let mut chunks = Vec::new();
        for (start, end, hidx) in sections {
            emit_section(view, config, start, end, hidx, &paths, &atomic, &mut chunks);
        }

        Ok(chunks)
    }
}

/// Emits chunks for one section, subdividing by deeper headers while the
/// section exceeds the size limit.
#[allow(clippy::too_many_arguments)]
fn emit_section(
    view: &DocumentView<'_>,
    config: &ChunkConfig,
    start_line: usize,
    end_line: usize,
    header_idx: Option<usize>,
    paths: &[Vec<String>],
    atomic: &[(usize, usize)],
    out: &mut Vec<Chunk>,
) {
    if start_line > end_line {
        return;
    }
    let headers = &view.fingerprint.headers;
    let range = view.index.span(start_line, end_line);
    let chars = char_count(&view.text[range.clone()]);
    if chars == 0 {
        return;
    }

    let path = header_idx.map(|i| paths[i].clone()).unwrap_or_default();

    if chars <= config.max_chunk_size {
        if let Some(mut chunk) = Chunk::from_span(view.text, view.index, range) {
            set_header_path(&mut chunk, &path);
            out.push(chunk);
        }
        return;
    }

    // Subdivide by the shallowest header level deeper than this section's.
    // A section that owns a header keeps its own line out of the
    // candidates; a headerless one may start on a header line.
    let section_level = header_idx.map_or(0, |i| headers[i].level);
    let line_bound = if header_idx.is_some() {
        start_line
    } else {
        start_line - 1
    };
    let inner: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            h.line > line_bound && h.line <= end_line && h.level > section_level
        })
        .map(|(i, _)| i)
        .collect();

    if let Some(next_level) = inner.iter().map(|&i| headers[i].level).min() {
        let subs: Vec<usize> = inner
            .into_iter()
            .filter(|&i| headers[i].level == next_level)
            .collect();

        let first_sub_line = headers[subs[0]].line;
        if first_sub_line > start_line {
            emit_section(
                view,
                config,
                start_line,
                first_sub_line - 1,
                header_idx,
                paths,
                atomic,
                out,
            );
        }
        let base = out.len();
        for (k, &si) in subs.iter().enumerate() {
            let sub_start = headers[si].line;
            let sub_end = subs
                .get(k + 1)
                .map_or(end_line, |&next| headers[next].line - 1);
            emit_section(view, config, sub_start, sub_end, Some(si), paths, atomic, out);
        }
        merge_short_sections(out, base, config);
        return;
    }

    // No deeper headers: split the text, keeping atomic spans whole.
    for (_, mut chunk) in chunk_segments(view, config, start_line, end_line, atomic) {
        set_header_path(&mut chunk, &path);
        out.push(chunk);
    }
}

/// Computes the ancestor path (including the header itself) for every
/// header, in document order.
fn header_paths(headers: &[Header]) -> Vec<Vec<String>> {
    let mut stack: Vec<(u8, String)> = Vec::new();
    let mut paths = Vec::with_capacity(headers.len());

    for header in headers {
        while stack.last().is_some_and(|(level, _)| *level >= header.level) {
            stack.pop();
        }
        let mut path: Vec<String> = stack.iter().map(|(_, text)| text.clone()).collect();
        path.push(header.text.clone());
        stack.push((header.level, header.text.clone()));
        paths.push(path);
    }

    paths
}

fn set_header_path(chunk: &mut Chunk, path: &[String]) {
    chunk.set_meta(
        "header_path",
        Value::Array(path.iter().map(|t| Value::String(t.clone())).collect()),
    );
}

/// Parent portion of a chunk's header path, for merge eligibility.
fn parent_path(chunk: &Chunk) -> Option<Vec<String>> {
    let path = chunk.metadata.get("header_path")?.as_array()?;
    let parent = path
        .iter()
        .take(path.len().saturating_sub(1))
        .filter_map(Value::as_str)
        .map(String::from)
        .collect();
    Some(parent)
}

/// Merges adjacent short sub-sections that share a parent header.
///
/// Runs over the chunks a single subdivision produced (`chunks[base..]`);
/// top-level boundary sections are never merged with each other.
fn merge_short_sections(chunks: &mut Vec<Chunk>, base: usize, config: &ChunkConfig) {
    let mut merged: Vec<Chunk> = Vec::with_capacity(chunks.len() - base);

    for chunk in chunks.drain(base..) {
        let mergeable = merged.last().is_some_and(|prev| {
            prev.char_count() < config.min_chunk_size
                && chunk.char_count() < config.min_chunk_size
                && prev.char_count() + 2 + chunk.char_count() <= config.max_chunk_size
                && parent_path(prev).is_some()
                && parent_path(prev) == parent_path(&chunk)
        });

        if mergeable {
            if let Some(prev) = merged.last_mut() {
                prev.content = format!("{}\n\n{}", prev.content, chunk.content);
                prev.end_line = chunk.end_line;
            }
        } else {
            merged.push(chunk);
        }
    }

    chunks.append(&mut merged);
}
