//! The chunking pipeline.
//!
//! One linear, synchronous flow per document: normalize, analyze, select
//! a strategy, run it under the fallback chain, apply overlap, enrich
//! metadata, and validate completeness. The core performs no I/O and
//! keeps no state across calls.

pub mod enrich;
pub mod overlap;
pub mod validate;

pub use validate::{BlockType, MissingContentBlock, ValidationReport};

use crate::analyzer;
use crate::chunking::{self, DocumentView};
use crate::core::{ChunkConfig, ChunkingResult};
use crate::error::Result;
use crate::io::{normalize, LineIndex};
use std::time::Instant;

/// Chunks a Markdown document.
///
/// The single entry point of the core: validates the configuration,
/// normalizes line endings, and runs the full pipeline. Empty input
/// yields a result with zero chunks and no errors.
///
/// # Examples
///
/// ```
/// use mdchunk_rs::{chunk, ChunkConfig};
///
/// let result = chunk("# Title\n\nSome text.\n", &ChunkConfig::default()).unwrap();
/// assert!(!result.chunks.is_empty());
/// ```
///
/// # Errors
///
/// Returns a configuration error for out-of-bounds options, and a
/// completeness error when `strict_validation` is set and coverage
/// fails. Strategy failures never surface; they are absorbed by the
/// fallback chain and reported through `result.errors`.
pub fn chunk(text: &str, config: &ChunkConfig) -> Result<ChunkingResult> {
    let config = config.clone().validated()?;
    let started = Instant::now();

    let normalized = normalize(text);
    if normalized.trim().is_empty() {
        return Ok(ChunkingResult {
            processing_time: started.elapsed().as_secs_f64(),
            ..ChunkingResult::default()
        });
    }

    let index = LineIndex::new(&normalized);
    let analysis = analyzer::analyze(&normalized);
    let mut warnings = analysis.warnings;
    let mut errors = analysis.errors;

    let view = DocumentView {
        text: &normalized,
        index: &index,
        fingerprint: &analysis.fingerprint,
    };

    let primary = chunking::select(&analysis.fingerprint, &config);
    let outcome = chunking::run_chain(primary, &view, &config);
    errors.extend(outcome.errors);

    let mut chunks = outcome.chunks;

    let inline_overlap = if config.enable_overlap && chunks.len() > 1 {
        overlap::apply(&mut chunks, &config).inline_chars
    } else {
        0
    };

    enrich::enrich(
        &mut chunks,
        outcome.strategy_used,
        outcome.fallback_level,
        &config,
    );

    let report = validate::validate(&normalized, &chunks, inline_overlap, &config);
    if config.strict_validation {
        if let Some(err) = validate::strict_error(&report, &config) {
            return Err(err.into());
        }
    }
    warnings.extend(report.warnings);
    errors.extend(report.errors);

    Ok(ChunkingResult {
        chunks,
        strategy_used: outcome.strategy_used.name().to_string(),
        fallback_used: outcome.fallback_level > 0,
        fallback_level: outcome.fallback_level,
        processing_time: started.elapsed().as_secs_f64(),
        errors,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OverlapMode;

    #[test]
    fn test_empty_input() {
        let result = chunk("", &ChunkConfig::default()).unwrap();
        assert!(result.chunks.is_empty());
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_whitespace_only_input() {
        let result = chunk("  \n\n \n", &ChunkConfig::default()).unwrap();
        assert!(result.chunks.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_invalid_config_raises() {
        let config = ChunkConfig::new().max_chunk_size(0);
        assert!(chunk("text", &config).is_err());
    }

    #[test]
    fn test_simple_document() {
        let result = chunk("A paragraph.\n\nAnother paragraph.\n", &ChunkConfig::default())
            .unwrap();
        assert_eq!(result.strategy_used, "fallback");
        assert_eq!(result.fallback_level, 0);
        assert!(!result.fallback_used);
        assert_eq!(result.chunks.len(), 1);
        assert!(result.processing_time >= 0.0);
    }

    #[test]
    fn test_crlf_input_normalized() {
        let result = chunk(
            "# Title\r\n\r\nBody text.\r\n",
            &ChunkConfig::new().enable_overlap(false),
        )
        .unwrap();
        assert_eq!(result.chunks.len(), 1);
        assert!(!result.chunks[0].content.contains('\r'));
    }

    #[test]
    fn test_metadata_attached() {
        let result = chunk(
            "First paragraph here.\n\nSecond paragraph there.\n",
            &ChunkConfig::new().max_chunk_size(25).min_chunk_size(5),
        )
        .unwrap();
        assert!(result.chunks.len() > 1);
        let first = &result.chunks[0];
        assert!(first.meta_bool("is_first_chunk"));
        assert_eq!(first.meta_str("strategy"), Some("fallback"));
    }

    #[test]
    fn test_overlap_modes_share_metadata() {
        let text = "One sentence here. Two sentences here.\n\nSecond paragraph follows now.\n";
        let base = ChunkConfig::new()
            .max_chunk_size(45)
            .min_chunk_size(5)
            .overlap_size(14);

        let inline = chunk(text, &base).unwrap();
        let meta_only = chunk(
            text,
            &base.clone().overlap_mode(OverlapMode::MetadataOnly),
        )
        .unwrap();

        let overlapped_inline: Vec<_> = inline
            .chunks
            .iter()
            .filter(|c| c.meta_bool("has_overlap"))
            .collect();
        let overlapped_meta: Vec<_> = meta_only
            .chunks
            .iter()
            .filter(|c| c.meta_bool("has_overlap"))
            .collect();
        assert_eq!(overlapped_inline.len(), overlapped_meta.len());

        for (a, b) in overlapped_inline.iter().zip(&overlapped_meta) {
            assert_eq!(a.meta_str("previous_content"), b.meta_str("previous_content"));
            assert!(a.content.len() > b.content.len());
        }
    }

    #[test]
    fn test_strict_validation_raises_on_loss() {
        // A chunk list that loses half the input cannot happen through
        // the normal pipeline, so force it with a tiny tolerance.
        let text = "word ".repeat(50);
        let config = ChunkConfig::new()
            .tolerance(0.0)
            .enable_overlap(false)
            .strict_validation(true);
        // Whitespace trimming alone loses a character against a zero
        // tolerance.
        let result = chunk(&text, &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_deterministic_output() {
        let text = "# A\n\ntext one.\n\n## B\n\ntext two.\n\n## C\n\n```rust\nlet x = 1;\n```\n";
        let config = ChunkConfig::default();
        let first = chunk(text, &config).unwrap();
        let second = chunk(text, &config).unwrap();
        assert_eq!(first.chunks, second.chunks);
        assert_eq!(first.strategy_used, second.strategy_used);
    }
}
