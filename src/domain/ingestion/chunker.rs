//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Configuration for chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters. Advisory: a single sentence longer
    /// than this is still emitted whole rather than being cut mid-sentence.
    pub max_chunk_size: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_chunk_size == 0 {
            return Err(DomainError::validation(
                "max_chunk_size must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
        }
    }
}

/// Provenance metadata attached to each chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document identifier (lowercased filename)
    pub source_file: String,
    /// Full heading line for numbered clauses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_heading: Option<String>,
    /// Extracted section number (e.g. `13-63-101`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
}

impl ChunkMetadata {
    /// Create metadata carrying only the source file
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            section_heading: None,
            section_number: None,
        }
    }

    /// Attach a section heading
    pub fn with_section_heading(mut self, heading: impl Into<String>) -> Self {
        self.section_heading = Some(heading.into());
        self
    }

    /// Attach an extracted section number
    pub fn with_section_number(mut self, number: impl Into<String>) -> Self {
        self.section_number = Some(number.into());
        self
    }
}

/// A chunk of regulation text plus provenance, the unit of retrieval.
///
/// Chunks are created once during segmentation and never mutated afterwards;
/// the serialized form is the boundary between the segmentation and
/// embedding passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk content, non-empty and trimmed
    pub text: String,
    /// Chunk provenance
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk. The text is trimmed on construction.
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into().trim().to_string(),
            metadata,
        }
    }

    /// Get the content length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the chunk is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Trait for document segmentation strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split document text into chunks with provenance metadata.
    ///
    /// A document with no extractable text yields an empty vector, not an
    /// error.
    fn chunk(
        &self,
        text: &str,
        source_file: &str,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock chunking strategy for testing
    #[derive(Debug, Default)]
    pub struct MockChunkingStrategy;

    impl ChunkingStrategy for MockChunkingStrategy {
        fn chunk(
            &self,
            text: &str,
            source_file: &str,
            config: &ChunkingConfig,
        ) -> Result<Vec<Chunk>, DomainError> {
            config.validate()?;

            if text.trim().is_empty() {
                return Ok(vec![]);
            }

            Ok(vec![Chunk::new(text, ChunkMetadata::new(source_file))])
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
