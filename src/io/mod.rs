//! I/O and text utilities.
//!
//! Normalization and Unicode helpers used by the core pipeline, plus the
//! file reader backing the CLI. The core never touches the filesystem.

pub mod normalize;
pub mod reader;
pub mod unicode;

pub use normalize::{LineIndex, normalize};
pub use reader::read_file;
pub use unicode::{
    byte_offset_of_chars, char_count, find_char_boundary, tail_chars, truncate_graphemes,
};
