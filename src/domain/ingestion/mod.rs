//! Document segmentation types

mod chunker;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
