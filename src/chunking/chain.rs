//! Fallback chain.
//!
//! Wraps strategy execution in a fixed linear cascade: the chosen primary,
//! then the structural strategy (level 1), then the universal fallback
//! (level 2), skipping any level equal to an already-tried strategy. A
//! strategy raising or returning zero chunks for non-empty input moves the
//! chain to the next level; errors accumulate across attempts.

use crate::chunking::{DocumentView, StrategyKind};
use crate::core::{Chunk, ChunkConfig};
use crate::error::{ChunkingError, Result};

/// What the chain produced, with provenance.
#[derive(Debug)]
pub struct ChainOutcome {
    /// Chunks from the first level that succeeded; empty when all failed.
    pub chunks: Vec<Chunk>,
    /// Strategy that produced the output (or the last one tried).
    pub strategy_used: StrategyKind,
    /// 0 = primary, 1 = structural, 2 = fallback.
    pub fallback_level: u8,
    /// Errors accumulated across failed attempts.
    pub errors: Vec<String>,
}

/// Runs the chain starting from the chosen primary strategy.
#[must_use]
pub fn run(primary: StrategyKind, view: &DocumentView<'_>, config: &ChunkConfig) -> ChainOutcome {
    let first = primary.apply(view, config);
    run_with(primary, first, view, config)
}

/// Runs the chain given the primary attempt's outcome.
///
/// Split out so tests can inject a failing primary without installing a
/// fourth strategy.
pub(crate) fn run_with(
    primary: StrategyKind,
    first: Result<Vec<Chunk>>,
    view: &DocumentView<'_>,
    config: &ChunkConfig,
) -> ChainOutcome {
    let mut errors = Vec::new();
    let mut tried = vec![primary];

    if let Some(chunks) = accept(primary, first, &mut errors) {
        return ChainOutcome {
            chunks,
            strategy_used: primary,
            fallback_level: 0,
            errors,
        };
    }

    if !config.enable_fallback {
        return ChainOutcome {
            chunks: Vec::new(),
            strategy_used: primary,
            fallback_level: 0,
            errors,
        };
    }

    for (level, kind) in [(1, StrategyKind::Structural), (2, StrategyKind::Fallback)] {
        if tried.contains(&kind) {
            continue;
        }
        tried.push(kind);
        let attempt = kind.apply(view, config);
        if let Some(mut chunks) = accept(kind, attempt, &mut errors) {
            let reason = format!("strategy '{}' produced no usable output", primary.name());
            for chunk in &mut chunks {
                chunk.set_meta("fallback_level", level);
                chunk.set_meta("fallback_reason", reason.as_str());
            }
            return ChainOutcome {
                chunks,
                strategy_used: kind,
                fallback_level: level,
                errors,
            };
        }
    }

    let last = *tried.last().unwrap_or(&primary);
    errors.push(
        ChunkingError::AllStrategiesFailed { last: last.name() }.to_string(),
    );
    ChainOutcome {
        chunks: Vec::new(),
        strategy_used: last,
        fallback_level: 2,
        errors,
    }
}

/// Accepts a successful non-empty attempt; records the failure otherwise.
fn accept(
    kind: StrategyKind,
    attempt: Result<Vec<Chunk>>,
    errors: &mut Vec<String>,
) -> Option<Vec<Chunk>> {
    match attempt {
        Ok(chunks) if !chunks.is_empty() => Some(chunks),
        Ok(_) => {
            errors.push(
                ChunkingError::EmptyOutput {
                    strategy: kind.name(),
                }
                .to_string(),
            );
            None
        }
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;
    use crate::io::LineIndex;

    fn with_view<T>(text: &str, f: impl FnOnce(&DocumentView<'_>) -> T) -> T {
        let analysis = analyzer::analyze(text);
        let index = LineIndex::new(text);
        let view = DocumentView {
            text,
            index: &index,
            fingerprint: &analysis.fingerprint,
        };
        f(&view)
    }

    fn failing_primary() -> Result<Vec<Chunk>> {
        Err(ChunkingError::StrategyFailed {
            strategy: "code_aware",
            reason: "injected failure".to_string(),
        }
        .into())
    }

    #[test]
    fn test_primary_success_level_zero() {
        let text = "a paragraph.\n\nanother.\n";
        let outcome = with_view(text, |view| {
            run(StrategyKind::Fallback, view, &ChunkConfig::default())
        });
        assert_eq!(outcome.fallback_level, 0);
        assert_eq!(outcome.strategy_used, StrategyKind::Fallback);
        assert!(!outcome.chunks.is_empty());
        assert!(outcome.errors.is_empty());
        assert!(!outcome.chunks[0].metadata.contains_key("fallback_reason"));
    }

    #[test]
    fn test_failed_primary_falls_to_structural() {
        let text = "# T\n\nintro\n\n## A\n\nbody\n\n## B\n\nbody\n";
        let outcome = with_view(text, |view| {
            run_with(
                StrategyKind::CodeAware,
                failing_primary(),
                view,
                &ChunkConfig::default(),
            )
        });
        assert_eq!(outcome.fallback_level, 1);
        assert_eq!(outcome.strategy_used, StrategyKind::Structural);
        assert!(!outcome.chunks.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        for chunk in &outcome.chunks {
            assert_eq!(chunk.meta_u64("fallback_level"), Some(1));
            assert!(chunk.meta_str("fallback_reason").is_some());
        }
    }

    #[test]
    fn test_cascade_to_universal_fallback() {
        // No headers, so the structural level fails too.
        let text = "p1\n\np2\n\np3\n";
        let outcome = with_view(text, |view| {
            run_with(
                StrategyKind::CodeAware,
                failing_primary(),
                view,
                &ChunkConfig::default(),
            )
        });
        assert_eq!(outcome.fallback_level, 2);
        assert_eq!(outcome.strategy_used, StrategyKind::Fallback);
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.errors.len(), 2);
        for chunk in &outcome.chunks {
            assert_eq!(chunk.meta_u64("fallback_level"), Some(2));
        }
    }

    #[test]
    fn test_structural_primary_not_retried() {
        // Primary is structural and fails; the chain goes straight to the
        // universal fallback.
        let text = "plain text\n";
        let outcome = with_view(text, |view| {
            run(StrategyKind::Structural, view, &ChunkConfig::default())
        });
        assert_eq!(outcome.fallback_level, 2);
        assert_eq!(outcome.strategy_used, StrategyKind::Fallback);
        assert!(!outcome.chunks.is_empty());
    }

    #[test]
    fn test_disabled_chain_returns_errors() {
        let text = "plain text\n";
        let config = ChunkConfig::new().enable_fallback(false);
        let outcome = with_view(text, |view| {
            run_with(StrategyKind::CodeAware, failing_primary(), view, &config)
        });
        assert!(outcome.chunks.is_empty());
        assert_eq!(outcome.fallback_level, 0);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_empty_output_treated_as_failure() {
        let text = "# T\n\nintro\n\n## A\n\nbody\n\n## B\n\nmore\n";
        let outcome = with_view(text, |view| {
            run_with(
                StrategyKind::CodeAware,
                Ok(Vec::new()),
                view,
                &ChunkConfig::default(),
            )
        });
        assert_eq!(outcome.fallback_level, 1);
        assert!(outcome.errors[0].contains("no chunks"));
    }
}
