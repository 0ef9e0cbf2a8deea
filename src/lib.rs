//! # mdchunk-rs
//!
//! Markdown chunking for Retrieval-Augmented Generation indexing.
//!
//! mdchunk-rs transforms a Markdown document into an ordered sequence of
//! chunks with structured metadata. Chunks respect atomic blocks (fenced
//! code, tables), prefer semantic boundaries when splitting, fit a
//! configured size window, and optionally overlap for context continuity.
//!
//! ## Pipeline
//!
//! - **Analyzer**: structural fingerprint (fences with nesting, headers,
//!   tables, lists, content ratios)
//! - **Selector**: picks one of three strategies by priority-weighted
//!   quality
//! - **Strategies**: code-aware, structural, fallback, wrapped in a
//!   fallback chain that guarantees non-empty output
//! - **Post-processing**: sentence-bounded overlap, metadata enrichment,
//!   completeness validation
//!
//! ## Example
//!
//! ```
//! use mdchunk_rs::{chunk, ChunkConfig};
//!
//! let text = "# Guide\n\nIntro.\n\n```rust\nfn main() {}\n```\n";
//! let result = chunk(text, &ChunkConfig::default()).unwrap();
//! assert!(!result.chunks.is_empty());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod analyzer;
pub mod chunking;
pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;

// Re-export commonly used types at crate root
pub use crate::error::{Error, Result};

// Re-export core domain types
pub use crate::core::{Chunk, ChunkConfig, ChunkingResult, OverlapMode};

// Re-export analyzer types
pub use crate::analyzer::{
    Analysis, ContentType, FencedBlock, Header, ListSpan, Span, StructuralFingerprint, TableSpan,
    analyze,
};

// Re-export chunking types
pub use crate::chunking::{StrategyKind, available_strategies, select};

// Re-export the pipeline entry point
pub use crate::pipeline::chunk;

// Re-export CLI types
pub use crate::cli::{Cli, Commands, OutputFormat};
