//! Completeness validator.
//!
//! Checks that the chunks cover the input without unbounded loss:
//! character counts within tolerance (overlap duplication subtracted),
//! line coverage without large gaps, and a missing-content inventory when
//! the result is invalid.

use crate::core::{Chunk, ChunkConfig};
use crate::error::CompletenessError;
use crate::io::{char_count, truncate_graphemes};
use serde::{Deserialize, Serialize};

/// Line-gap size above which coverage is considered broken.
const MAX_GAP_LINES: usize = 10;

/// Missing blocks larger than this raise `MissingContent` in strict mode.
const MISSING_BLOCK_THRESHOLD: usize = 50;

/// Maximum preview length in grapheme clusters.
const PREVIEW_GRAPHEMES: usize = 80;

/// Kind of content a missing block appears to be, inferred per line
/// pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// A header line.
    Header,
    /// A pipe-table row.
    Table,
    /// A list item.
    List,
    /// Fenced or indented code.
    Code,
    /// Anything else.
    Paragraph,
}

/// A span of input lines not represented by any chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingContentBlock {
    /// First missing line (1-based, inclusive).
    pub start_line: usize,
    /// Last missing line (1-based, inclusive).
    pub end_line: usize,
    /// Preview of the missing text, at most 80 graphemes.
    pub content_preview: String,
    /// Missing size in Unicode code points.
    pub size_chars: usize,
    /// Inferred content kind.
    pub block_type: BlockType,
}

/// Validation outcome attached to the chunking result.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// `|input − output| / input` after overlap subtraction.
    pub char_diff_ratio: f64,
    /// Total size of inter-chunk line gaps.
    pub gap_lines: usize,
    /// Missing content inventory; populated only when invalid.
    pub missing: Vec<MissingContentBlock>,
    /// Small-gap notices.
    pub warnings: Vec<String>,
    /// Violations, as strings for the result envelope.
    pub errors: Vec<String>,
    /// Whether coverage held within tolerance.
    pub valid: bool,
}

/// Validates chunk coverage of the normalized input.
///
/// `inline_overlap_chars` is the number of characters the overlap applier
/// duplicated into content, excluded from the comparison.
#[must_use]
pub fn validate(
    input: &str,
    chunks: &[Chunk],
    inline_overlap_chars: usize,
    config: &ChunkConfig,
) -> ValidationReport {
    let mut report = ValidationReport {
        valid: true,
        ..ValidationReport::default()
    };

    let input_chars = char_count(input);
    if input_chars == 0 {
        return report;
    }

    // Character coverage.
    let output_chars: usize = chunks.iter().map(Chunk::char_count).sum();
    let deduped = output_chars.saturating_sub(inline_overlap_chars);
    let diff = input_chars.abs_diff(deduped);
    #[allow(clippy::cast_precision_loss)]
    {
        report.char_diff_ratio = diff as f64 / input_chars as f64;
    }
    if report.char_diff_ratio > config.tolerance {
        report.valid = false;
        report.errors.push(
            CompletenessError::DataLoss {
                diff_ratio: report.char_diff_ratio,
                tolerance: config.tolerance,
            }
            .to_string(),
        );
    }

    // Line coverage between consecutive chunks.
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.start_line);
    for pair in ordered.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.start_line > prev.end_line + 1 {
            let gap = next.start_line - prev.end_line - 1;
            report.gap_lines += gap;
            if gap > MAX_GAP_LINES {
                report.valid = false;
            } else {
                report.warnings.push(format!(
                    "gap of {gap} line(s) after line {}",
                    prev.end_line
                ));
            }
        }
    }
    if report.gap_lines > MAX_GAP_LINES {
        report.valid = false;
        report.errors.push(
            CompletenessError::IncompleteCoverage {
                gap_lines: report.gap_lines,
            }
            .to_string(),
        );
    }

    if !report.valid {
        report.missing = missing_blocks(input, &ordered);
        if let Some(largest) = report.missing.iter().map(|b| b.size_chars).max() {
            if largest > MISSING_BLOCK_THRESHOLD {
                report.errors.insert(
                    0,
                    CompletenessError::MissingContent {
                        blocks: report.missing.len(),
                        largest_chars: largest,
                    }
                    .to_string(),
                );
            }
        }
    }

    report
}

/// Converts a failed report into the strict-mode error, most severe
/// first: missing content, then coverage, then character loss.
#[must_use]
pub fn strict_error(report: &ValidationReport, config: &ChunkConfig) -> Option<CompletenessError> {
    if report.valid {
        return None;
    }

    let largest = report.missing.iter().map(|b| b.size_chars).max();
    if let Some(largest) = largest.filter(|&l| l > MISSING_BLOCK_THRESHOLD) {
        return Some(CompletenessError::MissingContent {
            blocks: report.missing.len(),
            largest_chars: largest,
        });
    }
    if report.gap_lines > MAX_GAP_LINES {
        return Some(CompletenessError::IncompleteCoverage {
            gap_lines: report.gap_lines,
        });
    }
    Some(CompletenessError::DataLoss {
        diff_ratio: report.char_diff_ratio,
        tolerance: config.tolerance,
    })
}

/// Groups input lines not represented by any chunk into typed blocks.
fn missing_blocks(input: &str, ordered: &[&Chunk]) -> Vec<MissingContentBlock> {
    let lines: Vec<&str> = input.lines().collect();
    let mut covered = vec![false; lines.len()];
    for chunk in ordered {
        for flag in covered
            .iter_mut()
            .take(chunk.end_line.min(lines.len()))
            .skip(chunk.start_line.saturating_sub(1))
        {
            *flag = true;
        }
    }

    let mut blocks = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in 0..=lines.len() {
        let uncovered_content =
            i < lines.len() && !covered[i] && !lines[i].trim().is_empty();
        match (run_start, uncovered_content) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                // Runs are broken by covered lines; blank uncovered lines
                // extend the current run only if more content follows.
                let continues = i < lines.len() && !covered[i] && lines[i].trim().is_empty();
                if continues {
                    continue;
                }
                blocks.push(build_block(&lines, start, i));
                run_start = None;
            }
            _ => {}
        }
    }

    blocks
}

fn build_block(lines: &[&str], start: usize, end_exclusive: usize) -> MissingContentBlock {
    // Trim blank tail lines from the run.
    let mut end = end_exclusive;
    while end > start + 1 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }

    let content = lines[start..end].join("\n");
    let first = lines[start].trim_start();

    let block_type = if first.starts_with('#') {
        BlockType::Header
    } else if first.contains('|') {
        BlockType::Table
    } else if is_list_line(first) {
        BlockType::List
    } else if first.starts_with("```") || first.starts_with("~~~") || lines[start].starts_with("    ")
    {
        BlockType::Code
    } else {
        BlockType::Paragraph
    };

    MissingContentBlock {
        start_line: start + 1,
        end_line: end,
        content_preview: truncate_graphemes(&content, PREVIEW_GRAPHEMES).to_string(),
        size_chars: char_count(&content),
        block_type,
    }
}

fn is_list_line(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some('-' | '*' | '+') => chars.next().is_some_and(char::is_whitespace),
        Some(c) if c.is_ascii_digit() => {
            let rest: String = line.chars().skip_while(char::is_ascii_digit).collect();
            rest.starts_with(". ")
        }
        _ => false,
    }
}
