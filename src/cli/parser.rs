//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mdchunk-rs: Markdown chunking for RAG indexing.
///
/// Splits Markdown documents into retrieval-sized chunks that respect
/// code blocks, tables, and header structure.
#[derive(Parser, Debug)]
#[command(name = "mdchunk-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true, env = "MDCHUNK_FORMAT")]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk one or more Markdown files.
    ///
    /// Multiple files are processed in parallel, one document per task.
    Chunk {
        /// Markdown files to chunk.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum chunk size in characters.
        #[arg(long, default_value = "4096")]
        max_chunk_size: usize,

        /// Minimum chunk size for merge decisions.
        #[arg(long, default_value = "512")]
        min_chunk_size: usize,

        /// Overlap between adjacent chunks in characters (0 = proportional).
        #[arg(long, default_value = "200")]
        overlap: usize,

        /// Proportional overlap used when --overlap is 0.
        #[arg(long, default_value = "0.1")]
        overlap_percentage: f64,

        /// Disable overlap entirely.
        #[arg(long)]
        no_overlap: bool,

        /// Record overlap in metadata without touching chunk content.
        #[arg(long)]
        metadata_overlap: bool,

        /// Disable the strategy fallback chain.
        #[arg(long)]
        no_fallback: bool,

        /// Header level that starts a new section (1-6).
        #[arg(long, default_value = "2")]
        section_level: u8,

        /// Fail on completeness violations instead of reporting them.
        #[arg(long)]
        strict: bool,

        /// Prefix each chunk with a <metadata> block in text output.
        #[arg(long)]
        include_metadata: bool,
    },

    /// Print the structural fingerprint of a Markdown file.
    Analyze {
        /// Markdown file to analyze.
        file: PathBuf,
    },

    /// List the available chunking strategies.
    Strategies,
}
