//! Overlap applier.
//!
//! Prepends to each chunk (except the first) a sentence-bounded suffix of
//! the previous chunk's content. Overlap is always computed from the
//! content the strategy produced, never from already-overlapped text, and
//! is discarded whenever it would cut a fence in half.

use crate::chunking::splitter::sentence_end_pattern;
use crate::core::{Chunk, ChunkConfig, OverlapMode};
use crate::io::{char_count, tail_chars};
use regex::Regex;
use std::sync::OnceLock;

fn fence_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^\s*(`{3,}|~{3,})").expect("valid regex"))
}

/// Accounting for the completeness validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlapOutcome {
    /// Characters duplicated into chunk content (separators included);
    /// zero in metadata-only mode.
    pub inline_chars: usize,
    /// Number of chunk pairs that received overlap.
    pub pairs: usize,
}

/// Applies overlap across adjacent chunks in place.
pub fn apply(chunks: &mut [Chunk], config: &ChunkConfig) -> OverlapOutcome {
    let originals: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let mut outcome = OverlapOutcome::default();

    for i in 1..chunks.len() {
        let prev = &originals[i - 1];
        let prev_chars = char_count(prev);

        // Target, capped at 40% of the source chunk.
        let target = config.overlap_target(prev_chars).min(prev_chars * 2 / 5);
        if target == 0 {
            continue;
        }

        let Some(mut overlap) = extract_suffix(prev, target) else {
            continue;
        };

        // An odd number of fence markers means the overlap would open or
        // close a code block it does not contain; skip the pair.
        if fence_marker_pattern().find_iter(&overlap).count() % 2 == 1 {
            continue;
        }

        // Resulting chunk must stay within 1.5x the size limit and the
        // overlap within 45% of the result; shrink at sentence
        // boundaries until both hold.
        let chunk_chars = char_count(&originals[i]);
        while !overlap.is_empty() && !bounds_ok(&overlap, chunk_chars, config) {
            match drop_leading_sentence(&overlap) {
                Some(shorter) => overlap = shorter,
                None => {
                    overlap.clear();
                }
            }
        }
        if overlap.trim().is_empty() {
            continue;
        }

        let overlap_chars = char_count(&overlap);
        chunks[i].set_meta("has_overlap", true);
        chunks[i].set_meta("overlap_size", overlap_chars);
        chunks[i].set_meta("previous_content", overlap.as_str());
        chunks[i - 1].set_meta("next_content", overlap.as_str());

        if config.overlap_mode == OverlapMode::Inline {
            chunks[i].content = format!("{}\n\n{}", overlap, originals[i]);
            outcome.inline_chars += overlap_chars + 2;
        }
        outcome.pairs += 1;
    }

    outcome
}

/// Extracts a sentence-bounded suffix of at most `target` characters.
///
/// Sentences accumulate from the end until one more would overflow. A
/// most-recent sentence alone may exceed the target by up to half. With
/// no sentence boundary at all, the last `target` characters are taken.
fn extract_suffix(text: &str, target: usize) -> Option<String> {
    let starts = sentence_starts(text);

    if starts.len() <= 1 {
        let tail = tail_chars(text, target);
        return (!tail.trim().is_empty()).then(|| tail.to_string());
    }

    let mut taken = None;
    let mut acc = 0usize;
    for &start in starts.iter().rev() {
        let chars = char_count(&text[start..]) - acc;
        if acc == 0 {
            // Most recent sentence: the 1.5x exception applies.
            if chars <= target || chars * 2 <= target * 3 {
                taken = Some(start);
                acc = chars;
                continue;
            }
            break;
        }
        if acc + chars > target {
            break;
        }
        taken = Some(start);
        acc += chars;
    }

    let start = taken?;
    let suffix = text[start..].trim_start();
    (!suffix.is_empty()).then(|| suffix.to_string())
}

/// Byte offsets where sentences start, including offset 0.
fn sentence_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for m in sentence_end_pattern().find_iter(text) {
        if m.end() < text.len() {
            starts.push(m.end());
        }
    }
    starts
}

/// Removes the earliest sentence from an overlap fragment.
fn drop_leading_sentence(overlap: &str) -> Option<String> {
    let m = sentence_end_pattern().find(overlap)?;
    let rest = overlap[m.end()..].trim_start();
    (!rest.is_empty()).then(|| rest.to_string())
}

#[allow(clippy::cast_precision_loss)]
fn bounds_ok(overlap: &str, chunk_chars: usize, config: &ChunkConfig) -> bool {
    let overlap_chars = char_count(overlap);
    let result_chars = overlap_chars + 2 + chunk_chars;
    // result <= 1.5 * max  and  overlap <= 0.45 * result
    result_chars * 2 <= config.max_chunk_size * 3
        && (overlap_chars as f64) <= 0.45 * (result_chars as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_chunks(first: &str, second: &str) -> Vec<Chunk> {
        vec![
            Chunk::new(first.to_string(), 1, 1),
            Chunk::new(second.to_string(), 3, 3),
        ]
    }

    #[test]
    fn test_overlap_prepended_inline() {
        let mut chunks = two_chunks(
            "First sentence here. Second sentence follows. Third one ends.",
            "Next chunk body with enough text to hold an overlap.",
        );
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(20);
        let outcome = apply(&mut chunks, &config);

        assert_eq!(outcome.pairs, 1);
        assert!(chunks[1].meta_bool("has_overlap"));
        assert!(chunks[1].content.starts_with("Third one ends."));
        assert!(chunks[1].content.contains("\n\nNext chunk body"));
        assert_eq!(chunks[0].meta_str("next_content"), Some("Third one ends."));
        assert_eq!(
            chunks[1].meta_str("previous_content"),
            Some("Third one ends.")
        );
    }

    #[test]
    fn test_metadata_only_mode_keeps_content() {
        let mut chunks = two_chunks(
            "First sentence here. Second sentence follows. Third one ends.",
            "Next chunk body.",
        );
        let config = ChunkConfig::new()
            .max_chunk_size(400)
            .overlap_size(20)
            .overlap_mode(OverlapMode::MetadataOnly);
        let outcome = apply(&mut chunks, &config);

        assert_eq!(outcome.inline_chars, 0);
        assert_eq!(chunks[1].content, "Next chunk body.");
        assert!(chunks[1].meta_bool("has_overlap"));
        assert!(chunks[1].meta_str("previous_content").is_some());
    }

    #[test]
    fn test_overlap_accumulates_sentences() {
        let mut chunks = two_chunks(
            "This is the alpha sentence. Beta. Gamma.",
            "Body of the following chunk goes here.",
        );
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(25);
        apply(&mut chunks, &config);

        // "Beta. Gamma." is 12 chars and fits the target; adding the
        // 27-char alpha sentence would overflow it.
        assert_eq!(chunks[1].meta_str("previous_content"), Some("Beta. Gamma."));
    }

    #[test]
    fn test_most_recent_sentence_exception() {
        // The trailing sentence is 31 chars against a 25-char target:
        // over the target but within the 1.5x allowance.
        let mut chunks = two_chunks(
            "Filler sentence padding here okay. This trailing sentence is long.",
            "Following chunk content here with plenty of body text to hold it.",
        );
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(25);
        apply(&mut chunks, &config);

        assert_eq!(
            chunks[1].meta_str("previous_content"),
            Some("This trailing sentence is long.")
        );
    }

    #[test]
    fn test_no_boundary_falls_back_to_char_tail() {
        let mut chunks = two_chunks(
            "no punctuation at all just words and words",
            "Second chunk text.",
        );
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(10);
        apply(&mut chunks, &config);

        let overlap = chunks[1].meta_str("previous_content").unwrap();
        assert!(char_count(overlap) <= 10);
        assert!(chunks[1].meta_bool("has_overlap"));
    }

    #[test]
    fn test_unbalanced_fence_discards_overlap() {
        let mut chunks = two_chunks(
            "Intro text. ```rust\nlet inside = true;",
            "Second chunk text here.",
        );
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(60);
        let outcome = apply(&mut chunks, &config);

        assert_eq!(outcome.pairs, 0);
        assert!(!chunks[1].meta_bool("has_overlap"));
        assert_eq!(chunks[1].content, "Second chunk text here.");
        assert!(!chunks[0].metadata.contains_key("next_content"));
    }

    #[test]
    fn test_balanced_fences_keep_overlap() {
        let first = "Intro sentence here. ```\ncode\n``` tail words.";
        let mut chunks = two_chunks(first, "Second chunk text here with more words now.");
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(40);
        apply(&mut chunks, &config);

        assert!(chunks[1].meta_bool("has_overlap"));
        let overlap = chunks[1].meta_str("previous_content").unwrap();
        assert!(overlap.contains("```\ncode\n```"));
    }

    #[test]
    fn test_overlap_capped_at_forty_percent_of_source() {
        let mut chunks = two_chunks("Tiny. Prev.", "Second chunk body text.");
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(200);
        apply(&mut chunks, &config);

        if let Some(overlap) = chunks[1].meta_str("previous_content") {
            // Target capped at 40% of the 11-char source; the most-recent
            // sentence exception may stretch it by half again.
            assert!(char_count(overlap) <= 6);
        }
    }

    #[test]
    fn test_result_size_bound_truncates() {
        let prev = "Sentence alpha goes here. Sentence beta goes here. Sentence gamma.";
        let next = "n".repeat(120);
        let mut chunks = two_chunks(prev, &next);
        // 1.5 * 90 = 135: the full overlap would blow the result bound.
        let config = ChunkConfig::new()
            .max_chunk_size(90)
            .min_chunk_size(10)
            .overlap_size(26);
        apply(&mut chunks, &config);

        if chunks[1].meta_bool("has_overlap") {
            let overlap_chars = chunks[1].meta_u64("overlap_size").unwrap() as usize;
            assert!((overlap_chars + 2 + 120) * 2 <= 90 * 3);
        } else {
            // Fully truncated away is also within contract.
            assert_eq!(chunks[1].content, next);
        }
    }

    #[test]
    fn test_zero_overlap_disabled() {
        let mut chunks = two_chunks("First. Second.", "Next chunk.");
        let config = ChunkConfig::new().overlap_size(0).overlap_percentage(0.0);
        let outcome = apply(&mut chunks, &config);
        assert_eq!(outcome.pairs, 0);
        assert!(!chunks[1].meta_bool("has_overlap"));
    }

    #[test]
    fn test_first_chunk_never_gets_overlap() {
        let mut chunks = two_chunks("One. Two.", "Three. Four.");
        let config = ChunkConfig::new().overlap_size(5);
        apply(&mut chunks, &config);
        assert!(!chunks[0].meta_bool("has_overlap"));
    }

    #[test]
    fn test_overlap_from_original_not_overlapped_content() {
        let mut chunks = vec![
            Chunk::new("Alpha sentence one here.".to_string(), 1, 1),
            Chunk::new("Beta sentence two here.".to_string(), 3, 3),
            Chunk::new("Gamma sentence three here.".to_string(), 5, 5),
        ];
        let config = ChunkConfig::new().max_chunk_size(400).overlap_size(9);
        apply(&mut chunks, &config);

        // The third chunk's overlap comes from the second's original
        // content, not from the overlapped version.
        if let Some(overlap) = chunks[2].meta_str("previous_content") {
            assert!(!overlap.contains("Alpha"));
        }
    }
}
