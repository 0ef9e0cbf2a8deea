//! Structural fingerprint of a document.
//!
//! The analyzer's output: structural inventories (fences, headers, tables,
//! lists), content-type ratios, a classification, and a complexity score.
//! The strategy selector works exclusively from this view.

use crate::analyzer::fences::FencedBlock;
use crate::analyzer::structure::{Header, ListSpan, TableSpan};
use serde::{Deserialize, Serialize};

/// An inclusive 1-based line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First line (1-based, inclusive).
    pub start_line: usize,
    /// Last line (1-based, inclusive).
    pub end_line: usize,
}

/// Document classification derived from content ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// Dominated by fenced code.
    CodeHeavy,
    /// Dominated by lists.
    ListHeavy,
    /// Several content kinds in meaningful proportion.
    Mixed,
    /// Mostly prose.
    TextHeavy,
}

impl ContentType {
    /// Returns the canonical name of the classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeHeavy => "code-heavy",
            Self::ListHeavy => "list-heavy",
            Self::Mixed => "mixed",
            Self::TextHeavy => "text-heavy",
        }
    }
}

/// The parsed structural view of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralFingerprint {
    /// Total size in Unicode code points.
    pub total_chars: usize,

    /// Total number of lines.
    pub total_lines: usize,

    /// Fenced blocks ordered by start line, nesting resolved.
    pub fenced_blocks: Vec<FencedBlock>,

    /// Headers ordered by line.
    pub headers: Vec<Header>,

    /// Table spans ordered by start line.
    pub tables: Vec<TableSpan>,

    /// List spans ordered by start line.
    pub lists: Vec<ListSpan>,

    /// Share of characters inside fenced-block bodies, in [0, 1].
    pub code_ratio: f64,

    /// Share of characters inside list spans, in [0, 1].
    pub list_ratio: f64,

    /// Share of characters inside tables, in [0, 1].
    pub table_ratio: f64,

    /// Remaining share: `max(0, 1 − code − list − table)`.
    pub text_ratio: f64,

    /// Classification derived from the ratios.
    pub content_type: ContentType,

    /// Aggregate complexity in [0, 1]. Not a probability.
    pub complexity_score: f64,

    /// Content before the first header, if any.
    pub preamble: Option<Span>,
}

impl StructuralFingerprint {
    /// Builds a degraded fingerprint with empty structural lists.
    ///
    /// Used when structural extraction cannot be trusted; the selector
    /// then falls through to the universal strategy.
    #[must_use]
    pub fn degraded(total_chars: usize, total_lines: usize) -> Self {
        Self {
            total_chars,
            total_lines,
            fenced_blocks: Vec::new(),
            headers: Vec::new(),
            tables: Vec::new(),
            lists: Vec::new(),
            code_ratio: 0.0,
            list_ratio: 0.0,
            table_ratio: 0.0,
            text_ratio: 1.0,
            content_type: ContentType::TextHeavy,
            complexity_score: 0.0,
            preamble: None,
        }
    }

    /// Deepest header level present, or 0 without headers.
    #[must_use]
    pub fn max_header_depth(&self) -> u8 {
        self.headers.iter().map(|h| h.level).max().unwrap_or(0)
    }

    /// Deepest list nesting present, or 0 without lists.
    #[must_use]
    pub fn max_list_depth(&self) -> usize {
        self.lists.iter().map(|l| l.max_depth).max().unwrap_or(0)
    }

    /// Returns true when the document contains a table.
    #[must_use]
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Top-level fenced blocks, the atomic candidates for strategies.
    pub fn top_level_fences(&self) -> impl Iterator<Item = &FencedBlock> {
        self.fenced_blocks.iter().filter(|b| b.is_top_level())
    }

    /// True iff at least three of the four content ratios exceed 0.1.
    #[must_use]
    pub fn has_mixed_content(&self) -> bool {
        [
            self.code_ratio,
            self.list_ratio,
            self.table_ratio,
            self.text_ratio,
        ]
        .iter()
        .filter(|&&r| r > 0.1)
        .count()
            >= 3
    }
}

/// Classifies a document from its ratios. First matching rule wins.
#[must_use]
pub fn classify(
    code_ratio: f64,
    list_ratio: f64,
    table_ratio: f64,
    text_ratio: f64,
) -> ContentType {
    let mixed = [code_ratio, list_ratio, table_ratio, text_ratio]
        .iter()
        .filter(|&&r| r > 0.1)
        .count()
        >= 3;

    if mixed && code_ratio > 0.1 && code_ratio < 0.8 {
        ContentType::Mixed
    } else if code_ratio > 0.7 {
        ContentType::CodeHeavy
    } else if list_ratio > 0.6 && code_ratio < 0.3 && !mixed {
        ContentType::ListHeavy
    } else {
        ContentType::TextHeavy
    }
}

/// Computes the complexity score in [0, 1].
///
/// Additive structural, content, and size components, capped at 1.0.
#[must_use]
pub fn complexity(
    max_header_depth: u8,
    max_list_depth: usize,
    has_tables: bool,
    code_ratio: f64,
    has_mixed_content: bool,
    total_chars: usize,
) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let structural = (f64::from(max_header_depth) / 6.0).min(1.0) * 0.1
        + (max_list_depth as f64 / 5.0).min(1.0) * 0.1
        + if has_tables { 0.1 } else { 0.0 };

    let code_component = if code_ratio > 0.5 {
        0.2
    } else if code_ratio > 0.2 {
        0.1
    } else {
        0.0
    };
    let content = code_component + if has_mixed_content { 0.2 } else { 0.0 };

    let size = if total_chars > 50_000 {
        0.3
    } else if total_chars > 20_000 {
        0.2
    } else if total_chars > 10_000 {
        0.1
    } else {
        0.0
    };

    (structural + content + size).min(1.0)
}
