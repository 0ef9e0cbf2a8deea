//! Strategy selection.
//!
//! Evaluates each strategy's `can_handle` predicate against the
//! fingerprint and picks the best by priority-weighted quality score.

use crate::analyzer::StructuralFingerprint;
use crate::chunking::StrategyKind;
use crate::core::ChunkConfig;

/// Selects the strategy for a document.
///
/// `weighted = 0.5·(1/priority) + 0.5·quality_score`, highest wins; ties
/// break toward the lower priority number. The fallback strategy handles
/// everything, so a strategy is always returned.
#[must_use]
pub fn select(fingerprint: &StructuralFingerprint, config: &ChunkConfig) -> StrategyKind {
    let mut best = StrategyKind::Fallback;
    let mut best_score = f64::NEG_INFINITY;

    for kind in StrategyKind::ALL {
        if !kind.can_handle(fingerprint, config) {
            continue;
        }
        let weighted =
            0.5 * (1.0 / f64::from(kind.priority())) + 0.5 * kind.quality_score(fingerprint, config);
        // Iteration runs in priority order, so a strict comparison keeps
        // the lower priority number on ties.
        if weighted > best_score {
            best = kind;
            best_score = weighted;
        }
    }

    best
}
