//! Chunking result envelope.
//!
//! The return value of the top-level entry point: chunks plus strategy
//! provenance, timing, and accumulated errors and warnings.

use crate::core::Chunk;
use serde::{Deserialize, Serialize};

/// The outcome of chunking one document.
///
/// The chunk list is always well-formed (possibly empty); failures that
/// the pipeline absorbed are reported through `errors` and `warnings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// Chunks ordered by `start_line`.
    pub chunks: Vec<Chunk>,

    /// Name of the strategy that produced the output, after fallback
    /// resolution.
    pub strategy_used: String,

    /// Whether any fallback level was used.
    pub fallback_used: bool,

    /// Which tier produced the output: 0 = primary, 1 = structural,
    /// 2 = fallback.
    pub fallback_level: u8,

    /// Wall-clock processing time in seconds.
    pub processing_time: f64,

    /// Errors absorbed during processing (strategy failures, completeness
    /// violations in non-strict mode).
    pub errors: Vec<String>,

    /// Recoverable anomalies (unclosed fences, small line gaps).
    pub warnings: Vec<String>,
}

impl ChunkingResult {
    /// Returns the number of chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total content size across chunks in Unicode code points.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.chunks.iter().map(Chunk::char_count).sum()
    }
}
