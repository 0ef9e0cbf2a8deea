//! Header, table, and list extraction.
//!
//! All three run over normalized lines with a fence mask: anything inside
//! a fenced block (fence lines included) is invisible to them.

use crate::analyzer::fences::FencedBlock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A Markdown header outside any fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header level, 1-6.
    pub level: u8,
    /// Header text after the marker, trimmed.
    pub text: String,
    /// Line number (1-based).
    pub line: usize,
}

/// A pipe-table span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpan {
    /// First line of the table (1-based, inclusive).
    pub start_line: usize,
    /// Last line of the table (1-based, inclusive).
    pub end_line: usize,
    /// Number of columns in the header row.
    pub columns: usize,
}

/// A list span with nesting information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSpan {
    /// First line of the span (1-based, inclusive).
    pub start_line: usize,
    /// Last line of the span (1-based, inclusive).
    pub end_line: usize,
    /// Maximum nesting depth among items (0 = top-level items only).
    pub max_depth: usize,
    /// Number of list items in the span.
    pub items: usize,
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"))
}

fn list_item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\s*)([-*+]|\d+\.)\s+\S").expect("valid regex"))
}

/// Marks every line covered by a top-level fenced block, fences included.
#[must_use]
pub fn fence_mask(line_count: usize, blocks: &[FencedBlock]) -> Vec<bool> {
    let mut mask = vec![false; line_count];
    for block in blocks.iter().filter(|b| b.is_top_level()) {
        for flag in mask
            .iter_mut()
            .take(block.end_line)
            .skip(block.start_line - 1)
        {
            *flag = true;
        }
    }
    mask
}

/// Extracts headers from lines outside fenced blocks.
#[must_use]
pub fn extract_headers(lines: &[&str], mask: &[bool]) -> Vec<Header> {
    let mut headers = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if mask.get(i).copied().unwrap_or(false) {
            continue;
        }
        if let Some(caps) = header_pattern().captures(line) {
            let marker = caps.get(1).map_or("", |m| m.as_str());
            let text = caps.get(2).map_or("", |m| m.as_str());
            #[allow(clippy::cast_possible_truncation)]
            headers.push(Header {
                level: marker.len() as u8,
                text: text.trim().to_string(),
                line: i + 1,
            });
        }
    }
    headers
}

/// Checks whether a line is a table separator row: only `|`, `-`, `:` and
/// whitespace, containing a pipe and at least two cells.
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.contains('|') {
        return false;
    }
    if !trimmed
        .chars()
        .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
    {
        return false;
    }
    cell_count(trimmed) >= 2
}

/// Counts cells in a table row, ignoring empty edge cells from leading or
/// trailing pipes.
fn cell_count(line: &str) -> usize {
    let mut cells: Vec<&str> = line.split('|').collect();
    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells.len()
}

/// Extracts table spans from lines outside fenced blocks.
///
/// A table begins at a line containing a pipe whose successor is a
/// separator row, and extends while subsequent lines contain a pipe.
#[must_use]
pub fn extract_tables(lines: &[&str], mask: &[bool]) -> Vec<TableSpan> {
    let mut tables = Vec::new();
    let masked = |i: usize| mask.get(i).copied().unwrap_or(false);
    let mut i = 0;

    while i < lines.len() {
        let is_start = !masked(i)
            && lines[i].contains('|')
            && i + 1 < lines.len()
            && !masked(i + 1)
            && is_separator_row(lines[i + 1]);
        if !is_start {
            i += 1;
            continue;
        }

        let columns = cell_count(lines[i]);
        let mut end = i + 1;
        while end + 1 < lines.len() && !masked(end + 1) && lines[end + 1].contains('|') {
            end += 1;
        }
        tables.push(TableSpan {
            start_line: i + 1,
            end_line: end + 1,
            columns,
        });
        i = end + 1;
    }

    tables
}

/// Indent width in space-equivalents; tabs count as 4.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Extracts list spans from lines outside fenced blocks and tables.
///
/// A span ends when a blank line is followed by a line of lesser indent
/// that carries no list marker, or when a header, table, or fence begins.
#[must_use]
pub fn extract_lists(lines: &[&str], mask: &[bool], tables: &[TableSpan]) -> Vec<ListSpan> {
    let mut table_mask = vec![false; lines.len()];
    for table in tables {
        for flag in table_mask
            .iter_mut()
            .take(table.end_line)
            .skip(table.start_line - 1)
        {
            *flag = true;
        }
    }

    let mut spans = Vec::new();
    let mut current: Option<ListSpan> = None;
    let mut last_item_indent = 0usize;
    let masked = |i: usize| {
        mask.get(i).copied().unwrap_or(false) || table_mask.get(i).copied().unwrap_or(false)
    };

    for (i, line) in lines.iter().enumerate() {
        if masked(i) || header_pattern().is_match(line) {
            if let Some(span) = current.take() {
                spans.push(span);
            }
            continue;
        }

        if let Some(caps) = list_item_pattern().captures(line) {
            let indent = indent_width(caps.get(1).map_or("", |m| m.as_str()));
            let depth = indent / 2;
            last_item_indent = indent;
            match current.as_mut() {
                Some(span) => {
                    span.end_line = i + 1;
                    span.max_depth = span.max_depth.max(depth);
                    span.items += 1;
                }
                None => {
                    current = Some(ListSpan {
                        start_line: i + 1,
                        end_line: i + 1,
                        max_depth: depth,
                        items: 1,
                    });
                }
            }
        } else if line.trim().is_empty() {
            if current.is_some() {
                let ends = lines.get(i + 1).is_some_and(|next| {
                    !next.trim().is_empty()
                        && !list_item_pattern().is_match(next)
                        && indent_width(next) < last_item_indent.max(1)
                });
                if ends {
                    if let Some(span) = current.take() {
                        spans.push(span);
                    }
                }
            }
        } else if let Some(span) = current.as_mut() {
            // Continuation line belonging to the current item.
            span.end_line = i + 1;
        }
    }

    if let Some(span) = current.take() {
        spans.push(span);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::fences;

    fn no_mask(lines: &[&str]) -> Vec<bool> {
        vec![false; lines.len()]
    }

    #[test]
    fn test_extract_headers() {
        let lines = vec!["# One", "text", "### Three", "####### too deep"];
        let headers = extract_headers(&lines, &no_mask(&lines));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].level, 1);
        assert_eq!(headers[0].text, "One");
        assert_eq!(headers[0].line, 1);
        assert_eq!(headers[1].level, 3);
        assert_eq!(headers[1].line, 3);
    }

    #[test]
    fn test_header_requires_space() {
        let lines = vec!["#NoSpace", "# Yes"];
        let headers = extract_headers(&lines, &no_mask(&lines));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].text, "Yes");
    }

    #[test]
    fn test_headers_skip_fences() {
        let text = "# Real\n```\n# Not a header\n```";
        let lines: Vec<&str> = text.lines().collect();
        let scan = fences::scan(&lines);
        let mask = fence_mask(lines.len(), &scan.blocks);
        let headers = extract_headers(&lines, &mask);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].text, "Real");
    }

    #[test]
    fn test_extract_table() {
        let lines = vec!["| a | b |", "|---|---|", "| 1 | 2 |", "| 3 | 4 |", "plain"];
        let tables = extract_tables(&lines, &no_mask(&lines));
        assert_eq!(tables.len(), 1);
        let table = tables[0];
        assert_eq!(table.start_line, 1);
        assert_eq!(table.end_line, 4);
        assert_eq!(table.columns, 2);
    }

    #[test]
    fn test_table_requires_separator() {
        let lines = vec!["| a | b |", "| 1 | 2 |"];
        let tables = extract_tables(&lines, &no_mask(&lines));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_separator_needs_two_cells() {
        assert!(is_separator_row("|---|---|"));
        assert!(is_separator_row("---|---"));
        assert!(is_separator_row("| :-- | --: |"));
        assert!(!is_separator_row("|---|"));
        assert!(!is_separator_row("---"));
        assert!(!is_separator_row("| a | b |"));
    }

    #[test]
    fn test_cell_count_edges() {
        assert_eq!(cell_count("| a | b |"), 2);
        assert_eq!(cell_count("a | b | c"), 3);
    }

    #[test]
    fn test_table_never_spans_fence() {
        let text = "| a | b |\n|---|---|\n```\n| not | table |\n```";
        let lines: Vec<&str> = text.lines().collect();
        let scan = fences::scan(&lines);
        let mask = fence_mask(lines.len(), &scan.blocks);
        let tables = extract_tables(&lines, &mask);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].end_line, 2);
    }

    #[test]
    fn test_extract_simple_list() {
        let lines = vec!["- one", "- two", "- three"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].items, 3);
        assert_eq!(spans[0].max_depth, 0);
        assert_eq!(spans[0].start_line, 1);
        assert_eq!(spans[0].end_line, 3);
    }

    #[test]
    fn test_nested_list_depth() {
        let lines = vec!["- a", "  - b", "    - c", "1. d"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].max_depth, 2);
        assert_eq!(spans[0].items, 4);
    }

    #[test]
    fn test_list_ends_at_dedented_prose() {
        let lines = vec!["- one", "  - two", "", "plain paragraph", "- restart"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].end_line, 2);
        assert_eq!(spans[1].start_line, 5);
    }

    #[test]
    fn test_list_survives_blank_before_item() {
        let lines = vec!["- one", "", "- two"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].items, 2);
    }

    #[test]
    fn test_list_ends_at_header() {
        let lines = vec!["- one", "# Header", "- two"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_ordered_list_marker() {
        let lines = vec!["1. first", "2. second", "10. tenth"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].items, 3);
    }

    #[test]
    fn test_marker_requires_content() {
        let lines = vec!["-", "- real"];
        let spans = extract_lists(&lines, &no_mask(&lines), &[]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].items, 1);
        assert_eq!(spans[0].start_line, 2);
    }
}
