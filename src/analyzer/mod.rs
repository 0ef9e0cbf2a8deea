//! Markdown structural analysis.
//!
//! Derives a [`StructuralFingerprint`] from normalized source in a single
//! O(n) pass plus bounded secondary scans: a stack-based fence scanner,
//! header/table/list extraction over non-fenced lines, content ratios,
//! and classification.

pub mod fences;
pub mod fingerprint;
pub mod structure;

pub use fences::{FenceScan, FencedBlock};
pub use fingerprint::{ContentType, Span, StructuralFingerprint};
pub use structure::{Header, ListSpan, TableSpan};

use crate::io::char_count;

/// Analyzer output: the fingerprint plus anything recoverable it noticed.
#[derive(Debug)]
pub struct Analysis {
    /// The structural fingerprint.
    pub fingerprint: StructuralFingerprint,
    /// Recoverable anomalies (unclosed fences, small irregularities).
    pub warnings: Vec<String>,
    /// Invariant violations absorbed during extraction.
    pub errors: Vec<String>,
}

/// Analyzes normalized text into a structural fingerprint.
///
/// The input must already be line-ending normalized (see
/// [`crate::io::normalize`]); all line numbers refer to it. Analysis never
/// fails: anomalies surface as warnings or errors on the returned
/// [`Analysis`] and extraction continues with what could be trusted.
#[must_use]
pub fn analyze(text: &str) -> Analysis {
    let lines: Vec<&str> = text.lines().collect();
    let total_chars = char_count(text);
    let total_lines = lines.len();

    let scan = fences::scan(&lines);
    let mask = structure::fence_mask(total_lines, &scan.blocks);
    let headers = structure::extract_headers(&lines, &mask);
    let tables = structure::extract_tables(&lines, &mask);
    let lists = structure::extract_lists(&lines, &mask, &tables);

    let code_chars: usize = scan
        .blocks
        .iter()
        .filter(|b| b.is_top_level())
        .map(|b| char_count(&b.content))
        .sum();
    let list_chars = span_chars(&lines, lists.iter().map(|l| (l.start_line, l.end_line)));
    let table_chars = span_chars(&lines, tables.iter().map(|t| (t.start_line, t.end_line)));

    #[allow(clippy::cast_precision_loss)]
    let ratio = |chars: usize| {
        if total_chars == 0 {
            0.0
        } else {
            chars as f64 / total_chars as f64
        }
    };
    let code_ratio = ratio(code_chars);
    let list_ratio = ratio(list_chars);
    let table_ratio = ratio(table_chars);
    let text_ratio = (1.0 - code_ratio - list_ratio - table_ratio).max(0.0);

    let content_type = fingerprint::classify(code_ratio, list_ratio, table_ratio, text_ratio);

    let preamble = headers.first().and_then(|first| {
        let before = &lines[..first.line - 1];
        if before.iter().any(|l| !l.trim().is_empty()) {
            Some(Span {
                start_line: 1,
                end_line: first.line - 1,
            })
        } else {
            None
        }
    });

    let max_header_depth = headers.iter().map(|h| h.level).max().unwrap_or(0);
    let max_list_depth = lists.iter().map(|l| l.max_depth).max().unwrap_or(0);
    let has_tables = !tables.is_empty();
    let mixed = [code_ratio, list_ratio, table_ratio, text_ratio]
        .iter()
        .filter(|&&r| r > 0.1)
        .count()
        >= 3;
    let complexity_score = fingerprint::complexity(
        max_header_depth,
        max_list_depth,
        has_tables,
        code_ratio,
        mixed,
        total_chars,
    );

    Analysis {
        fingerprint: StructuralFingerprint {
            total_chars,
            total_lines,
            fenced_blocks: scan.blocks,
            headers,
            tables,
            lists,
            code_ratio,
            list_ratio,
            table_ratio,
            text_ratio,
            content_type,
            complexity_score,
            preamble,
        },
        warnings: scan.warnings,
        errors: scan.errors,
    }
}

/// Sums characters of the lines covered by the given 1-based inclusive
/// spans, one newline per line included.
fn span_chars(lines: &[&str], spans: impl Iterator<Item = (usize, usize)>) -> usize {
    spans
        .map(|(start, end)| {
            lines[start - 1..end.min(lines.len())]
                .iter()
                .map(|l| char_count(l) + 1)
                .sum::<usize>()
        })
        .sum()
}
