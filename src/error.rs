//! Error types for mdchunk-rs operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! all chunking operations including configuration, analysis, strategies,
//! completeness validation, and CLI commands.

use thiserror::Error;

/// Result type alias for chunking operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for chunking operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (caller's fault, raised before processing).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analyzer errors (structural extraction).
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Strategy errors (chunk production).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Completeness errors (coverage validation, strict mode only).
    #[error("completeness error: {0}")]
    Completeness(#[from] CompletenessError),

    /// I/O errors (file operations, CLI surface only).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Internal invariant violations. These indicate a bug.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },
}

/// Configuration validation errors.
///
/// These are the caller's fault and are raised synchronously before any
/// processing takes place.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An integer field that must be positive was zero.
    #[error("{field} must be > 0")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A ratio field fell outside its allowed range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Section boundary level outside 1..=6.
    #[error("section_boundary_level must be within 1..=6, got {level}")]
    BoundaryLevel {
        /// Supplied level.
        level: u8,
    },
}

/// Analyzer errors for structural extraction.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Two fenced-block candidates strictly overlap.
    #[error("overlapping fenced blocks at lines {first_start} and {second_start}")]
    OverlappingBlocks {
        /// Start line of the outer candidate.
        first_start: usize,
        /// Start line of the dropped inner candidate.
        second_start: usize,
    },

    /// Structural extraction could not be trusted; a degraded fingerprint
    /// was returned instead.
    #[error("analysis degraded: {reason}")]
    Degraded {
        /// Why the fingerprint was degraded.
        reason: String,
    },
}

/// Strategy errors for chunk production.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// A strategy produced no chunks for non-empty input.
    #[error("strategy '{strategy}' produced no chunks for non-empty input")]
    EmptyOutput {
        /// Name of the strategy.
        strategy: &'static str,
    },

    /// A strategy failed outright.
    #[error("strategy '{strategy}' failed: {reason}")]
    StrategyFailed {
        /// Name of the strategy.
        strategy: &'static str,
        /// Reason for the failure.
        reason: String,
    },

    /// Every level of the fallback chain failed.
    #[error("all strategies failed (last: {last})")]
    AllStrategiesFailed {
        /// Name of the last strategy attempted.
        last: &'static str,
    },

    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
}

/// Completeness validation errors.
///
/// Attached to the result as strings in non-strict mode; raised in strict
/// mode.
#[derive(Error, Debug)]
pub enum CompletenessError {
    /// At least one missing content block exceeds 50 characters.
    #[error("missing content: {blocks} block(s), largest {largest_chars} chars")]
    MissingContent {
        /// Number of missing content blocks.
        blocks: usize,
        /// Size of the largest missing block in characters.
        largest_chars: usize,
    },

    /// The sum of line-gap sizes exceeds 10 lines.
    #[error("incomplete coverage: {gap_lines} line(s) not covered by any chunk")]
    IncompleteCoverage {
        /// Total number of uncovered lines.
        gap_lines: usize,
    },

    /// Character-count mismatch beyond tolerance.
    #[error("data loss: character diff ratio {diff_ratio:.4} exceeds tolerance {tolerance:.4}")]
    DataLoss {
        /// Observed |input − output| / input ratio.
        diff_ratio: f64,
        /// Configured tolerance.
        tolerance: f64,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

// Implement From traits for standard library and ecosystem errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<regex::Error> for ChunkingError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Command(CommandError::OutputFormat(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: test error");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NonPositive {
            field: "max_chunk_size",
        };
        assert_eq!(err.to_string(), "max_chunk_size must be > 0");

        let err = ConfigError::OutOfRange {
            field: "tolerance",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("tolerance"));
        assert!(err.to_string().contains("1.5"));

        let err = ConfigError::BoundaryLevel { level: 9 };
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::OverlappingBlocks {
            first_start: 3,
            second_start: 7,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('7'));

        let err = AnalysisError::Degraded {
            reason: "scanner state".to_string(),
        };
        assert!(err.to_string().contains("scanner state"));
    }

    #[test]
    fn test_chunking_error_display() {
        let err = ChunkingError::EmptyOutput {
            strategy: "structural",
        };
        assert!(err.to_string().contains("structural"));

        let err = ChunkingError::StrategyFailed {
            strategy: "code_aware",
            reason: "bad span".to_string(),
        };
        assert!(err.to_string().contains("bad span"));

        let err = ChunkingError::AllStrategiesFailed { last: "fallback" };
        assert!(err.to_string().contains("fallback"));
    }

    #[test]
    fn test_completeness_error_display() {
        let err = CompletenessError::MissingContent {
            blocks: 2,
            largest_chars: 120,
        };
        assert!(err.to_string().contains("120"));

        let err = CompletenessError::IncompleteCoverage { gap_lines: 14 };
        assert!(err.to_string().contains("14"));

        let err = CompletenessError::DataLoss {
            diff_ratio: 0.25,
            tolerance: 0.05,
        };
        assert!(err.to_string().contains("0.25"));
    }

    #[test]
    fn test_io_error_display() {
        let err = IoError::FileNotFound {
            path: "/tmp/test.md".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/test.md");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::InvalidArgument("--bad".to_string());
        assert!(err.to_string().contains("--bad"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_config() {
        let cfg_err = ConfigError::NonPositive { field: "x" };
        let err: Error = cfg_err.into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_error_from_completeness() {
        let err: Error = CompletenessError::IncompleteCoverage { gap_lines: 11 }.into();
        assert!(matches!(err, Error::Completeness(_)));
    }

    #[test]
    #[allow(clippy::invalid_regex)]
    fn test_from_regex_error_to_chunking_error() {
        let regex_err = regex::Regex::new("[invalid").unwrap_err();
        let err: ChunkingError = regex_err.into();
        assert!(matches!(err, ChunkingError::Regex(_)));
    }

    #[test]
    fn test_from_serde_json_error_to_command_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::OutputFormat(_)));
    }
}
