//! Core domain models.
//!
//! The fundamental data structures of the chunking pipeline: chunks, the
//! caller-supplied configuration, and the result envelope. These are pure
//! domain models with no I/O dependencies.

pub mod chunk;
pub mod config;
pub mod result;

pub use chunk::Chunk;
pub use config::{ChunkConfig, OverlapMode};
pub use result::ChunkingResult;
