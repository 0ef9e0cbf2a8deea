//! CLI command implementations.
//!
//! Thin glue between the parsed arguments and the core pipeline: read
//! files, build a configuration, run `chunk`, and format the output.
//! Multiple input files are chunked in parallel; the core itself stays
//! single-threaded per document.

use crate::analyzer;
use crate::cli::output::{
    OutputFormat, format_fingerprint, format_result, format_strategies,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::{ChunkConfig, ChunkingResult, OverlapMode};
use crate::error::Result;
use crate::io::{normalize, read_file};
use crate::pipeline::chunk;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns an error when a file cannot be read, the configuration is
/// invalid, strict validation fails, or output serialization fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Chunk {
            files,
            max_chunk_size,
            min_chunk_size,
            overlap,
            overlap_percentage,
            no_overlap,
            metadata_overlap,
            no_fallback,
            section_level,
            strict,
            include_metadata,
        } => {
            let config = ChunkConfig::new()
                .max_chunk_size(*max_chunk_size)
                .min_chunk_size(*min_chunk_size)
                .overlap_size(*overlap)
                .overlap_percentage(*overlap_percentage)
                .enable_overlap(!no_overlap)
                .overlap_mode(if *metadata_overlap {
                    OverlapMode::MetadataOnly
                } else {
                    OverlapMode::Inline
                })
                .enable_fallback(!no_fallback)
                .section_boundary_level(*section_level)
                .strict_validation(*strict);

            cmd_chunk(files, &config, *include_metadata, format)
        }
        Commands::Analyze { file } => cmd_analyze(file, format),
        Commands::Strategies => Ok(format_strategies(format)),
    }
}

/// Chunks each file and concatenates the formatted results.
///
/// One document per task: files fan out across threads, the pipeline
/// itself has no internal parallelism.
fn cmd_chunk(
    files: &[PathBuf],
    config: &ChunkConfig,
    include_metadata: bool,
    format: OutputFormat,
) -> Result<String> {
    let results: Vec<(String, ChunkingResult)> = if files.len() > 1 {
        files
            .par_iter()
            .map(|path| chunk_file(path, config))
            .collect::<Result<_>>()?
    } else {
        files
            .iter()
            .map(|path| chunk_file(path, config))
            .collect::<Result<_>>()?
    };

    let mut out = String::new();
    for (path, result) in &results {
        out.push_str(&format_result(path, result, include_metadata, format)?);
    }
    Ok(out)
}

fn chunk_file(path: &Path, config: &ChunkConfig) -> Result<(String, ChunkingResult)> {
    let content = read_file(path)?;
    let result = chunk(&content, config)?;
    Ok((path.display().to_string(), result))
}

fn cmd_analyze(path: &Path, format: OutputFormat) -> Result<String> {
    let content = read_file(path)?;
    let normalized = normalize(&content);
    let analysis = analyzer::analyze(&normalized);
    format_fingerprint(&path.display().to_string(), &analysis.fingerprint, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn run(args: &[&str]) -> Result<String> {
        execute(&Cli::parse_from(args))
    }

    #[test]
    fn test_chunk_single_file() {
        let file = write_temp("# Title\n\nSome body text.\n");
        let path = file.path().to_string_lossy().to_string();
        let out = run(&["mdchunk-rs", "chunk", &path]).unwrap();
        assert!(out.contains("1 chunk(s)"));
        assert!(out.contains("# Title"));
    }

    #[test]
    fn test_chunk_multiple_files_in_parallel() {
        let a = write_temp("First document.\n");
        let b = write_temp("Second document.\n");
        let pa = a.path().to_string_lossy().to_string();
        let pb = b.path().to_string_lossy().to_string();
        let out = run(&["mdchunk-rs", "chunk", &pa, &pb]).unwrap();
        assert!(out.contains("First document."));
        assert!(out.contains("Second document."));
    }

    #[test]
    fn test_chunk_missing_file() {
        let result = run(&["mdchunk-rs", "chunk", "/no/such/file.md"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chunk_include_metadata() {
        let file = write_temp("Some text.\n");
        let path = file.path().to_string_lossy().to_string();
        let out = run(&["mdchunk-rs", "chunk", &path, "--include-metadata"]).unwrap();
        assert!(out.contains("<metadata>"));
        assert!(out.contains("\"strategy\""));
    }

    #[test]
    fn test_chunk_invalid_config() {
        let file = write_temp("text\n");
        let path = file.path().to_string_lossy().to_string();
        let result = run(&["mdchunk-rs", "chunk", &path, "--max-chunk-size", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_text_output() {
        let file = write_temp("# A\n\n```rust\nlet x = 1;\n```\n");
        let path = file.path().to_string_lossy().to_string();
        let out = run(&["mdchunk-rs", "analyze", &path]).unwrap();
        assert!(out.contains("content type:"));
        assert!(out.contains("fenced blocks: 1"));
    }

    #[test]
    fn test_analyze_json_output() {
        let file = write_temp("# A\n\nbody\n");
        let path = file.path().to_string_lossy().to_string();
        let out = run(&["mdchunk-rs", "--format", "json", "analyze", &path]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total_lines"], 3);
    }

    #[test]
    fn test_strategies_command() {
        let out = run(&["mdchunk-rs", "strategies"]).unwrap();
        assert!(out.contains("code_aware"));
    }
}
