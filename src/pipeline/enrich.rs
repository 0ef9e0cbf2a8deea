//! Metadata enricher.
//!
//! Attaches positional, strategy, and content-derived metadata to every
//! chunk. Content-type fields appear only when a cheap regex confirms the
//! feature is actually present; pure statistics stay out of the output.

use crate::chunking::StrategyKind;
use crate::core::{Chunk, ChunkConfig};
use crate::io::char_count;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {{
        static $name: OnceLock<Regex> = OnceLock::new();
        $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
    }};
}

fn fence_line() -> &'static Regex {
    static_regex!(FENCE_LINE, r"(?m)^\s*(`{3,}|~{3,})(\w*)")
}

/// Enriches all chunks in place.
pub fn enrich(
    chunks: &mut [Chunk],
    strategy: StrategyKind,
    fallback_level: u8,
    config: &ChunkConfig,
) {
    let total = chunks.len();
    let sizes: Vec<usize> = chunks.iter().map(Chunk::char_count).collect();

    for i in 0..total {
        let (chunk, size) = (&mut chunks[i], sizes[i]);
        chunk.set_meta("chunk_index", i);
        chunk.set_meta("total_chunks", total);
        chunk.set_meta("is_first_chunk", i == 0);
        chunk.set_meta("is_last_chunk", i + 1 == total);
        chunk.set_meta("strategy", strategy.name());
        chunk.set_meta("fallback_level", fallback_level);

        enrich_code(chunk);
        enrich_lists(chunk);
        enrich_tables(chunk);
        enrich_headers(chunk);
        enrich_indicators(chunk);

        let prev = (i > 0).then(|| sizes[i - 1]);
        let next = sizes.get(i + 1).copied();
        if is_small_chunk(&chunks[i], size, prev, next, config) {
            chunks[i].set_meta("small_chunk", true);
        }
    }
}

/// Code fields: fence language, inline code, imports, comments.
fn enrich_code(chunk: &mut Chunk) {
    let content = chunk.content.clone();
    let content = content.as_str();

    if static_regex!(INLINE_CODE, r"`[^`\n]+`").is_match(content) {
        chunk.set_meta("has_inline_code", true);
    }

    let fence_langs: Vec<String> = fence_line()
        .captures_iter(content)
        .filter_map(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if fence_langs.is_empty() && !fence_line().is_match(content) {
        return;
    }

    if let Some(language) = dominant(&fence_langs) {
        chunk.set_meta("language", language.as_str());
    }

    let body = fenced_body(content);
    if static_regex!(
        IMPORTS,
        r"(?m)^\s*(import\s|from\s+\S+\s+import\s|use\s+\S+|#include\s|require[\s(])"
    )
    .is_match(&body)
    {
        chunk.set_meta("has_imports", true);
    }
    if static_regex!(COMMENTS, r"(?m)^\s*(//|#(?:\s|!)|/\*|--\s)").is_match(&body) {
        chunk.set_meta("has_comments", true);
    }
}

/// Most frequent language tag among the chunk's fences.
fn dominant(langs: &[String]) -> Option<&String> {
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for lang in langs {
        *counts.entry(lang).or_insert(0) += 1;
    }
    langs
        .iter()
        .max_by_key(|l| counts.get(l).copied().unwrap_or(0))
}

/// Concatenated bodies of the fenced regions in a chunk.
fn fenced_body(content: &str) -> String {
    let mut body = String::new();
    let mut inside = false;
    for line in content.lines() {
        if fence_line().is_match(line) {
            inside = !inside;
            continue;
        }
        if inside {
            body.push_str(line);
            body.push('\n');
        }
    }
    body
}

fn enrich_lists(chunk: &mut Chunk) {
    let content = chunk.content.clone();
    let content = content.as_str();
    let bullets = static_regex!(BULLET_ITEM, r"(?m)^\s*[-*+]\s+\S")
        .find_iter(content)
        .count();
    let ordered = static_regex!(ORDERED_ITEM, r"(?m)^\s*\d+\.\s+\S")
        .find_iter(content)
        .count();
    if bullets == 0 && ordered == 0 {
        return;
    }

    if bullets > 0 {
        chunk.set_meta("bullet_list_items", bullets);
    }
    if ordered > 0 {
        chunk.set_meta("ordered_list_items", ordered);
    }
    if static_regex!(NESTED_ITEM, r"(?m)^\s{2,}([-*+]|\d+\.)\s+\S").is_match(content) {
        chunk.set_meta("has_nested_lists", true);
    }
}

fn enrich_tables(chunk: &mut Chunk) {
    let content = chunk.content.clone();
    let content = content.as_str();
    let separator = static_regex!(TABLE_SEP, r"(?m)^[\|\-\:\s]+$");

    let mut sep_line: Option<&str> = None;
    let mut pipe_rows = 0usize;
    let mut columns = 0usize;
    for line in content.lines() {
        if !line.contains('|') {
            continue;
        }
        if separator.is_match(line) {
            sep_line.get_or_insert(line);
        } else {
            pipe_rows += 1;
            if columns == 0 {
                columns = line.split('|').filter(|c| !c.trim().is_empty()).count();
            }
        }
    }

    let Some(sep) = sep_line else { return };
    chunk.set_meta("row_count", pipe_rows);
    chunk.set_meta("column_count", columns);
    if sep.contains(':') {
        chunk.set_meta("has_column_alignment", true);
    }
}

fn enrich_headers(chunk: &mut Chunk) {
    let content = chunk.content.clone();
    let content = content.as_str();
    let levels: Vec<usize> = static_regex!(HEADER_LINE, r"(?m)^(#{1,6})\s+\S")
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().len())
        .collect();
    if levels.is_empty() {
        return;
    }
    if let (Some(&min), Some(&max)) = (levels.iter().min(), levels.iter().max()) {
        chunk.set_meta("min_header_level", min);
        chunk.set_meta("max_header_level", max);
    }
}

fn enrich_indicators(chunk: &mut Chunk) {
    let content = chunk.content.clone();
    let content = content.as_str();
    if static_regex!(BOLD, r"\*\*[^*\n]+\*\*|__[^_\n]+__").is_match(content) {
        chunk.set_meta("has_bold", true);
    }
    if static_regex!(ITALIC, r"\*[^*\n]+\*|\b_[^_\n]+_\b").is_match(content) {
        chunk.set_meta("has_italic", true);
    }
    if static_regex!(URL, r"https?://[^\s)>\]]+").is_match(content) {
        chunk.set_meta("has_urls", true);
    }
    if static_regex!(
        EMAIL,
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"
    )
    .is_match(content)
    {
        chunk.set_meta("has_emails", true);
    }
}

/// The small-chunk flag: below the minimum size, lacking structural
/// strength, and unable to merge with either neighbor within the limit.
fn is_small_chunk(
    chunk: &Chunk,
    size: usize,
    prev_size: Option<usize>,
    next_size: Option<usize>,
    config: &ChunkConfig,
) -> bool {
    if size >= config.min_chunk_size {
        return false;
    }

    let has_strong_header = static_regex!(H23, r"(?m)^##{1,2}\s+\S").is_match(&chunk.content);
    let non_header_lines = chunk
        .content
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .count();
    let text_chars: usize = chunk
        .content
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .map(|l| char_count(l.trim()))
        .sum();
    let weak = !has_strong_header && non_header_lines < 3 && text_chars < 100;
    if !weak {
        return false;
    }

    let can_merge = |other: Option<usize>| {
        other.is_some_and(|o| size + 2 + o <= config.max_chunk_size)
    };
    !can_merge(prev_size) && !can_merge(next_size)
}
