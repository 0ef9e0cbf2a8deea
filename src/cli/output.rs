//! Output formatting for CLI commands.
//!
//! Supports text, JSON, and newline-delimited JSON. The text encoding of
//! a chunk is fixed for compatibility with existing consumers:
//!
//! ```text
//! <metadata>
//! {...}
//! </metadata>
//! chunk content
//! ```
//!
//! with the metadata block present only when requested.

use crate::analyzer::StructuralFingerprint;
use crate::chunking::StrategyKind;
use crate::core::{Chunk, ChunkingResult};
use crate::error::{Error, Result};
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (one chunk per line).
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }
}

/// Formats one file's chunking result.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub fn format_result(
    path: &str,
    result: &ChunkingResult,
    include_metadata: bool,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_result_text(path, result, include_metadata)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result).map_err(Error::from)?),
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for chunk in &result.chunks {
                out.push_str(&serde_json::to_string(chunk).map_err(Error::from)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn format_result_text(path: &str, result: &ChunkingResult, include_metadata: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{path}: {} chunk(s), strategy {}{}",
        result.chunk_count(),
        result.strategy_used,
        if result.fallback_used {
            format!(" (fallback level {})", result.fallback_level)
        } else {
            String::new()
        }
    );
    for warning in &result.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    for error in &result.errors {
        let _ = writeln!(out, "error: {error}");
    }
    out.push('\n');

    for chunk in &result.chunks {
        out.push_str(&encode_chunk(chunk, include_metadata));
        out.push('\n');
    }
    out
}

/// Encodes a single chunk in the fixed string format.
#[must_use]
pub fn encode_chunk(chunk: &Chunk, include_metadata: bool) -> String {
    let mut out = String::new();
    if include_metadata {
        let meta = serde_json::to_string(&chunk.metadata).unwrap_or_else(|_| "{}".to_string());
        out.push_str("<metadata>\n");
        out.push_str(&meta);
        out.push_str("\n</metadata>\n");
    }
    out.push_str(&chunk.content);
    out.push('\n');
    out
}

/// Formats a structural fingerprint.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub fn format_fingerprint(
    path: &str,
    fingerprint: &StructuralFingerprint,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => {
            Ok(serde_json::to_string_pretty(fingerprint).map_err(Error::from)?)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "{path}:");
            let _ = writeln!(out, "  lines:        {}", fingerprint.total_lines);
            let _ = writeln!(out, "  chars:        {}", fingerprint.total_chars);
            let _ = writeln!(out, "  content type: {}", fingerprint.content_type.as_str());
            let _ = writeln!(out, "  complexity:   {:.2}", fingerprint.complexity_score);
            let _ = writeln!(
                out,
                "  ratios:       code {:.2}, list {:.2}, table {:.2}, text {:.2}",
                fingerprint.code_ratio,
                fingerprint.list_ratio,
                fingerprint.table_ratio,
                fingerprint.text_ratio
            );
            let _ = writeln!(out, "  fenced blocks: {}", fingerprint.fenced_blocks.len());
            let _ = writeln!(out, "  headers:       {}", fingerprint.headers.len());
            let _ = writeln!(out, "  tables:        {}", fingerprint.tables.len());
            let _ = writeln!(out, "  lists:         {}", fingerprint.lists.len());
            Ok(out)
        }
    }
}

/// Formats the strategy listing.
#[must_use]
pub fn format_strategies(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => {
            let entries: Vec<serde_json::Value> = StrategyKind::ALL
                .iter()
                .map(|k| {
                    serde_json::json!({
                        "name": k.name(),
                        "priority": k.priority(),
                        "description": k.description(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str("Available strategies:\n");
            for kind in StrategyKind::ALL {
                let _ = writeln!(
                    out,
                    "  {:<12} priority {}  {}",
                    kind.name(),
                    kind.priority(),
                    kind.description()
                );
            }
            out
        }
    }
}

/// Formats an error for the chosen output format.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::json!({ "error": error.to_string() }).to_string()
        }
        OutputFormat::Text => error.to_string(),
    }
}
