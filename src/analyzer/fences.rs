//! Fenced-block extraction.
//!
//! A hand-written stack scanner, not a regex pass: fences nest by length
//! (a longer fence of the same character opens an inner block), which no
//! finite-state pattern can capture. After scanning, nesting is resolved
//! by containment and represented as an index-based tree.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum indent (in space-equivalents) for a fence line to count.
const MAX_FENCE_INDENT: usize = 3;

/// An atomic fenced code region.
///
/// `content` is the body between the fences, excluding the fence lines
/// themselves; `start_line` and `end_line` are the fence lines (inclusive).
/// A block with no matching close extends to the end of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FencedBlock {
    /// The fence character, `` ` `` or `~`.
    pub fence_char: char,

    /// Length of the opening fence run (≥ 3).
    pub fence_length: usize,

    /// Language identifier after the opening fence, if any.
    pub language: Option<String>,

    /// Body between the fences, excluding the fence lines.
    pub content: String,

    /// Line of the opening fence (1-based).
    pub start_line: usize,

    /// Line of the closing fence, or the last line when unclosed.
    pub end_line: usize,

    /// 0 for top-level; +1 per enclosing outer block.
    pub nesting_level: usize,

    /// Index of the enclosing block in the block list, if nested.
    pub parent: Option<usize>,

    /// Whether a matching close fence was found.
    pub closed: bool,
}

impl FencedBlock {
    /// Returns true when this block is not nested in another.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.nesting_level == 0
    }

    /// Line count spanned by the block, fences included.
    #[must_use]
    pub const fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Result of scanning a document for fenced blocks.
#[derive(Debug, Default)]
pub struct FenceScan {
    /// Extracted blocks, ordered by `start_line`, nesting resolved.
    pub blocks: Vec<FencedBlock>,
    /// Recoverable anomalies (unclosed fences).
    pub warnings: Vec<String>,
    /// Invariant violations (strictly overlapping candidates, dropped).
    pub errors: Vec<String>,
}

/// An open fence awaiting its close.
#[derive(Debug)]
struct OpenFence {
    fence_char: char,
    fence_length: usize,
    indent: usize,
    language: Option<String>,
    start_line: usize,
}

fn open_fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\s*)(`{3,}|~{3,})(\w*)").expect("valid regex"))
}

/// Indent width of a line's leading whitespace; tabs count as 4 spaces.
fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Parses a line as a fence opener: ≤ 3 spaces of indent, a run of at
/// least three backticks or tildes, and an optional language tag.
fn parse_opener(line: &str) -> Option<(usize, char, usize, Option<String>)> {
    let caps = open_fence_pattern().captures(line)?;
    let indent = indent_width(caps.get(1).map_or("", |m| m.as_str()));
    if indent > MAX_FENCE_INDENT {
        return None;
    }
    let fence = caps.get(2).map_or("", |m| m.as_str());
    let fence_char = fence.chars().next()?;
    let language = caps.get(3).map_or("", |m| m.as_str());
    let language = if language.is_empty() {
        None
    } else {
        Some(language.to_string())
    };
    Some((indent, fence_char, fence.chars().count(), language))
}

/// Checks whether a line closes the given open fence: same character,
/// run length ≥ the opening length, indent within the opening indent + 3,
/// and nothing else on the line.
fn closes(line: &str, open: &OpenFence) -> bool {
    let trimmed = line.trim_start();
    let indent = indent_width(line);
    if indent > open.indent + MAX_FENCE_INDENT {
        return false;
    }
    let run = trimmed.chars().take_while(|&c| c == open.fence_char).count();
    run >= open.fence_length && trimmed[run..].trim().is_empty()
}

/// Scans normalized lines for fenced blocks.
///
/// Emits blocks in `start_line` order with nesting levels and index-based
/// parent links assigned. Unclosed blocks extend to the last line and add
/// an "unclosed fence" warning.
#[must_use]
pub fn scan(lines: &[&str]) -> FenceScan {
    let mut stack: Vec<OpenFence> = Vec::new();
    let mut raw: Vec<FencedBlock> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;

        if let Some(top) = stack.last() {
            if closes(line, top) {
                if let Some(open) = stack.pop() {
                    raw.push(finish_block(open, line_no, true, lines));
                }
                continue;
            }
            if let Some((indent, ch, len, lang)) = parse_opener(line) {
                // A fence no longer than an open fence of the same
                // character never nests; it is content (or a close, which
                // was checked above).
                let max_open_same = stack
                    .iter()
                    .filter(|o| o.fence_char == ch)
                    .map(|o| o.fence_length)
                    .max();
                if max_open_same.is_none_or(|m| len > m) {
                    stack.push(OpenFence {
                        fence_char: ch,
                        fence_length: len,
                        indent,
                        language: lang,
                        start_line: line_no,
                    });
                }
            }
        } else if let Some((indent, ch, len, lang)) = parse_opener(line) {
            stack.push(OpenFence {
                fence_char: ch,
                fence_length: len,
                indent,
                language: lang,
                start_line: line_no,
            });
        }
    }

    let mut warnings = Vec::new();
    while let Some(open) = stack.pop() {
        warnings.push(format!("unclosed fence at line {}", open.start_line));
        raw.push(finish_block(open, lines.len(), false, lines));
    }

    raw.sort_by_key(|b| b.start_line);
    let errors = resolve_nesting(&mut raw);

    FenceScan {
        blocks: raw,
        warnings,
        errors,
    }
}

/// Builds a block from an open fence and its resolved end line.
fn finish_block(open: OpenFence, end_line: usize, closed: bool, lines: &[&str]) -> FencedBlock {
    // Interior lines exclude the opening fence, and the closing fence
    // when one was found.
    let interior_end = if closed { end_line - 1 } else { end_line };
    let content = if open.start_line < interior_end {
        lines[open.start_line..interior_end].join("\n")
    } else {
        String::new()
    };

    FencedBlock {
        fence_char: open.fence_char,
        fence_length: open.fence_length,
        language: open.language,
        content,
        start_line: open.start_line,
        end_line,
        nesting_level: 0,
        parent: None,
        closed,
    }
}

/// Assigns nesting levels and parent indices by containment, dropping
/// candidates that strictly overlap an earlier block.
///
/// Containment is `A.start < B.start && A.end > B.end`. The surviving
/// intervals form a laminar family, so a single enclosing-block stack
/// suffices. O(n·k) in the number of blocks.
fn resolve_nesting(blocks: &mut Vec<FencedBlock>) -> Vec<String> {
    let mut errors = Vec::new();

    // Drop strict overlaps: A.start < B.start <= A.end < B.end.
    let mut kept: Vec<FencedBlock> = Vec::with_capacity(blocks.len());
    for block in blocks.drain(..) {
        let overlapping = kept.iter().any(|a| {
            a.start_line < block.start_line
                && block.start_line <= a.end_line
                && a.end_line < block.end_line
        });
        if overlapping {
            errors.push(format!(
                "overlapping fenced block at line {} dropped",
                block.start_line
            ));
        } else {
            kept.push(block);
        }
    }

    // Walk outermost to innermost; each block's level is one more than
    // its innermost container's.
    let mut enclosing: Vec<usize> = Vec::new();
    for i in 0..kept.len() {
        while let Some(&top) = enclosing.last() {
            if kept[top].end_line < kept[i].start_line {
                enclosing.pop();
            } else {
                break;
            }
        }
        if let Some(&top) = enclosing.last() {
            kept[i].parent = Some(top);
            kept[i].nesting_level = kept[top].nesting_level + 1;
        }
        enclosing.push(i);
    }

    *blocks = kept;
    errors
}
