//! Chunking configuration.
//!
//! A single flat record with all recognized options and their defaults.
//! Bounds violations raise [`ConfigError`]; a `min_chunk_size` above
//! `max_chunk_size` is silently normalized instead.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default upper bound on chunk content size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4096;

/// Default floor for merge and small-chunk-flag decisions.
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 512;

/// Default absolute overlap size in characters.
pub const DEFAULT_OVERLAP_SIZE: usize = 200;

/// Default proportional overlap, used when `overlap_size` is 0.
pub const DEFAULT_OVERLAP_PERCENTAGE: f64 = 0.1;

/// Default code-ratio activation threshold for the code-aware strategy.
pub const DEFAULT_CODE_THRESHOLD: f64 = 0.3;

/// Default minimum header count for the structural strategy.
pub const DEFAULT_STRUCTURE_THRESHOLD: usize = 3;

/// Default header level used as section boundary.
pub const DEFAULT_SECTION_BOUNDARY_LEVEL: u8 = 2;

/// Default character-count tolerance for completeness validation.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// How overlap is delivered to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Overlap text is prepended to chunk content, with metadata fields
    /// mirroring the bounds. This matches observed upstream behavior.
    #[default]
    Inline,
    /// Chunk content is left untouched; overlap appears only in the
    /// `previous_content` / `next_content` metadata fields.
    MetadataOnly,
}

/// Caller-supplied chunking policy.
///
/// Defaults are baked into the record; use the builder-style setters to
/// adjust individual options.
///
/// # Examples
///
/// ```
/// use mdchunk_rs::core::ChunkConfig;
///
/// let config = ChunkConfig::new()
///     .max_chunk_size(1024)
///     .overlap_size(100)
///     .strict_validation(true);
/// assert_eq!(config.max_chunk_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Upper bound on chunk content size in characters. Atomic blocks may
    /// exceed it, marked `oversize: true`.
    pub max_chunk_size: usize,

    /// Floor for merge and small-chunk-flag decisions. Must be ≤ max.
    pub min_chunk_size: usize,

    /// Absolute overlap characters; 0 defers to `overlap_percentage`.
    pub overlap_size: usize,

    /// Proportional overlap in [0, 1]; used when `overlap_size` is 0.
    pub overlap_percentage: f64,

    /// Master switch for the overlap applier.
    pub enable_overlap: bool,

    /// Whether overlap is inline in content or metadata-only.
    pub overlap_mode: OverlapMode,

    /// Enables the fallback chain around strategy execution.
    pub enable_fallback: bool,

    /// Code-ratio activation threshold for the code-aware strategy, in [0, 1].
    pub code_threshold: f64,

    /// Minimum header count for the structural strategy.
    pub structure_threshold: usize,

    /// Header level used by the structural strategy as section boundary (1-6).
    pub section_boundary_level: u8,

    /// Keep fenced code and tables unsplit.
    pub preserve_atomic_blocks: bool,

    /// Allow content before the first header to form its own chunk.
    pub extract_preamble: bool,

    /// Character-count tolerance for completeness validation, in [0, 1].
    pub tolerance: f64,

    /// Raise on validator failure instead of warning.
    pub strict_validation: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            overlap_percentage: DEFAULT_OVERLAP_PERCENTAGE,
            enable_overlap: true,
            overlap_mode: OverlapMode::Inline,
            enable_fallback: true,
            code_threshold: DEFAULT_CODE_THRESHOLD,
            structure_threshold: DEFAULT_STRUCTURE_THRESHOLD,
            section_boundary_level: DEFAULT_SECTION_BOUNDARY_LEVEL,
            preserve_atomic_blocks: true,
            extract_preamble: true,
            tolerance: DEFAULT_TOLERANCE,
            strict_validation: false,
        }
    }
}

impl ChunkConfig {
    /// Creates a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum chunk size.
    #[must_use]
    pub const fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Sets the minimum chunk size.
    #[must_use]
    pub const fn min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    /// Sets the absolute overlap size.
    #[must_use]
    pub const fn overlap_size(mut self, size: usize) -> Self {
        self.overlap_size = size;
        self
    }

    /// Sets the proportional overlap.
    #[must_use]
    pub const fn overlap_percentage(mut self, pct: f64) -> Self {
        self.overlap_percentage = pct;
        self
    }

    /// Enables or disables overlap.
    #[must_use]
    pub const fn enable_overlap(mut self, enable: bool) -> Self {
        self.enable_overlap = enable;
        self
    }

    /// Sets the overlap delivery mode.
    #[must_use]
    pub const fn overlap_mode(mut self, mode: OverlapMode) -> Self {
        self.overlap_mode = mode;
        self
    }

    /// Enables or disables the fallback chain.
    #[must_use]
    pub const fn enable_fallback(mut self, enable: bool) -> Self {
        self.enable_fallback = enable;
        self
    }

    /// Sets the code-ratio threshold.
    #[must_use]
    pub const fn code_threshold(mut self, threshold: f64) -> Self {
        self.code_threshold = threshold;
        self
    }

    /// Sets the minimum header count for the structural strategy.
    #[must_use]
    pub const fn structure_threshold(mut self, threshold: usize) -> Self {
        self.structure_threshold = threshold;
        self
    }

    /// Sets the section boundary header level.
    #[must_use]
    pub const fn section_boundary_level(mut self, level: u8) -> Self {
        self.section_boundary_level = level;
        self
    }

    /// Sets whether atomic blocks are kept unsplit.
    #[must_use]
    pub const fn preserve_atomic_blocks(mut self, preserve: bool) -> Self {
        self.preserve_atomic_blocks = preserve;
        self
    }

    /// Sets whether the preamble may form its own chunk.
    #[must_use]
    pub const fn extract_preamble(mut self, extract: bool) -> Self {
        self.extract_preamble = extract;
        self
    }

    /// Sets the completeness tolerance.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets strict validation.
    #[must_use]
    pub const fn strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Validates bounds and normalizes inconsistencies.
    ///
    /// Positive-integer and range violations raise; `min_chunk_size` above
    /// `max_chunk_size` is silently normalized to `max_chunk_size / 2`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for non-positive sizes, out-of-range
    /// ratios, or a boundary level outside 1..=6.
    pub fn validated(mut self) -> std::result::Result<Self, ConfigError> {
        if self.max_chunk_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_chunk_size",
            });
        }
        if self.min_chunk_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "min_chunk_size",
            });
        }
        check_ratio("overlap_percentage", self.overlap_percentage)?;
        check_ratio("code_threshold", self.code_threshold)?;
        check_ratio("tolerance", self.tolerance)?;
        if self.section_boundary_level == 0 || self.section_boundary_level > 6 {
            return Err(ConfigError::BoundaryLevel {
                level: self.section_boundary_level,
            });
        }

        if self.min_chunk_size > self.max_chunk_size {
            self.min_chunk_size = (self.max_chunk_size / 2).max(1);
        }

        Ok(self)
    }

    /// Effective overlap target for a previous chunk of `prev_chars`
    /// characters, before the 40%-of-source cap.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn overlap_target(&self, prev_chars: usize) -> usize {
        if self.overlap_size > 0 {
            self.overlap_size
        } else {
            (self.overlap_percentage * prev_chars as f64).floor() as usize
        }
    }
}

fn check_ratio(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}
