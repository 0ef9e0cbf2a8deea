//! File reading utilities with memory mapping support.
//!
//! The CLI surface reads Markdown documents through this module; the core
//! pipeline itself performs no I/O. Large files are memory-mapped rather
//! than read into an intermediate buffer.

// Memory mapping requires unsafe but is safe for read-only access
#![allow(unsafe_code)]

use crate::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Threshold for using memory mapping (1MB).
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Maximum file size to read into memory (1GB).
const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Reads a file to a string, memory-mapping when it is large.
///
/// Files below [`MMAP_THRESHOLD`] are read directly; larger files are
/// mapped and validated as UTF-8 (lossy conversion on invalid sequences,
/// matching the read path for small files).
///
/// # Arguments
///
/// * `path` - Path to the file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for missing files,
/// [`IoError::ReadFailed`] for unreadable or oversized files, and
/// [`IoError::MmapFailed`] when mapping fails.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    let mut file = File::open(path_ref).map_err(|e| IoError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let size = file
        .metadata()
        .map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?
        .len();

    if size > MAX_FILE_SIZE {
        return Err(IoError::ReadFailed {
            path: path_str,
            reason: format!("file too large: {size} bytes (max: {MAX_FILE_SIZE} bytes)"),
        }
        .into());
    }

    if size >= MMAP_THRESHOLD {
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| IoError::MmapFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?
        };
        return Ok(String::from_utf8_lossy(&mmap).into_owned());
    }

    #[allow(clippy::cast_possible_truncation)]
    let mut buf = Vec::with_capacity(size as usize);
    file.read_to_end(&mut buf).map_err(|e| IoError::ReadFailed {
        path: path_str,
        reason: e.to_string(),
    })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
