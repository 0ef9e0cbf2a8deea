//! Chunking strategies.
//!
//! A closed set of three strategies produces chunks from the structural
//! fingerprint:
//!
//! - **Code-aware**: keeps fenced code and tables atomic, splits the text
//!   between them.
//! - **Structural**: sections along the header hierarchy with header-path
//!   metadata.
//! - **Fallback**: paragraph packing; universal, never fails.
//!
//! The set is fixed, so strategies are tagged variants dispatched through
//! [`StrategyKind`] rather than an open trait-object registry. The
//! [`chain`] module wraps execution in the fixed fallback cascade and
//! [`selector`] picks the primary.

pub mod chain;
pub mod code_aware;
pub mod fallback;
pub mod selector;
pub mod splitter;
pub mod structural;

pub use chain::{ChainOutcome, run as run_chain};
pub use code_aware::CodeAwareStrategy;
pub use fallback::FallbackStrategy;
pub use selector::select;
pub use splitter::split_range;
pub use structural::StructuralStrategy;

use crate::analyzer::StructuralFingerprint;
use crate::core::{Chunk, ChunkConfig};
use crate::error::Result;
use crate::io::LineIndex;
use serde::{Deserialize, Serialize};

/// Read-only view of a document handed to strategies.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    /// Normalized source text.
    pub text: &'a str,
    /// Line index over the same text.
    pub index: &'a LineIndex,
    /// Structural fingerprint from the analyzer.
    pub fingerprint: &'a StructuralFingerprint,
}

/// The closed set of chunking strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Atomic-block aware chunking for documents with code or tables.
    CodeAware,
    /// Header-hierarchy sectioning.
    Structural,
    /// Universal paragraph packing.
    Fallback,
}

impl StrategyKind {
    /// All strategies in priority order.
    pub const ALL: [Self; 3] = [Self::CodeAware, Self::Structural, Self::Fallback];

    /// Canonical strategy name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CodeAware => "code_aware",
            Self::Structural => "structural",
            Self::Fallback => "fallback",
        }
    }

    /// Fixed selection priority; lower is preferred.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::CodeAware => 1,
            Self::Structural => 2,
            Self::Fallback => 3,
        }
    }

    /// One-line description for CLI listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CodeAware => "Keeps fenced code and tables atomic, splits text between them",
            Self::Structural => "Sections the document along its header hierarchy",
            Self::Fallback => "Packs paragraphs greedily; handles any document",
        }
    }

    /// Looks a strategy up by its canonical name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "code_aware" | "code-aware" | "code" => Some(Self::CodeAware),
            "structural" => Some(Self::Structural),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }

    /// Whether this strategy applies to the fingerprinted document.
    #[must_use]
    pub fn can_handle(self, fingerprint: &StructuralFingerprint, config: &ChunkConfig) -> bool {
        match self {
            Self::CodeAware => {
                fingerprint.code_ratio >= config.code_threshold
                    || !fingerprint.fenced_blocks.is_empty()
                    || !fingerprint.tables.is_empty()
            }
            Self::Structural => {
                fingerprint.headers.len() >= config.structure_threshold
                    && fingerprint.max_header_depth() > 1
            }
            Self::Fallback => true,
        }
    }

    /// Fit quality in [0, 1], combined with priority by the selector.
    #[must_use]
    pub fn quality_score(self, fingerprint: &StructuralFingerprint, config: &ChunkConfig) -> f64 {
        match self {
            Self::CodeAware => {
                let ratio_part =
                    (fingerprint.code_ratio / config.code_threshold.max(0.05)).min(1.0) * 0.6;
                let fence_part = if fingerprint.fenced_blocks.is_empty() {
                    0.0
                } else {
                    0.2
                };
                let table_part = if fingerprint.has_tables() { 0.2 } else { 0.0 };
                ratio_part + fence_part + table_part
            }
            Self::Structural => {
                #[allow(clippy::cast_precision_loss)]
                let header_part = (fingerprint.headers.len() as f64 / 8.0).min(1.0) * 0.5;
                let depth_part =
                    (f64::from(fingerprint.max_header_depth()) / 4.0).min(1.0) * 0.3;
                header_part + depth_part + fingerprint.text_ratio * 0.2
            }
            Self::Fallback => 0.4,
        }
    }

    /// Produces chunks for the document.
    ///
    /// # Errors
    ///
    /// Strategy failures are consumed by the fallback chain; see
    /// [`chain::run`].
    pub fn apply(self, view: &DocumentView<'_>, config: &ChunkConfig) -> Result<Vec<Chunk>> {
        match self {
            Self::CodeAware => CodeAwareStrategy::apply(view, config),
            Self::Structural => StructuralStrategy::apply(view, config),
            Self::Fallback => FallbackStrategy::apply(view, config),
        }
    }
}

/// Lists the canonical strategy names in priority order.
#[must_use]
pub fn available_strategies() -> Vec<&'static str> {
    StrategyKind::ALL.iter().map(|k| k.name()).collect()
}
