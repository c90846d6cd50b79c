//! Vector store collaborator boundary
//!
//! The pipeline treats the store purely as a similarity index: a successful
//! upsert is visible to subsequent searches, and nothing more is assumed
//! about its internals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use crate::domain::ingestion::{Chunk, ChunkMetadata};
use crate::domain::DomainError;

/// Distance metric a collection is created with. Every collection shares the
/// same metric and embedding dimension, which is what makes cross-collection
/// score comparison valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
}

/// Payload stored with each point: the chunk text plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    #[serde(flatten)]
    pub metadata: ChunkMetadata,
}

impl From<Chunk> for ChunkPayload {
    fn from(chunk: Chunk) -> Self {
        Self {
            text: chunk.text,
            metadata: chunk.metadata,
        }
    }
}

/// A point to be written to a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl StoredPoint {
    pub fn new(id: Uuid, vector: Vec<f32>, payload: ChunkPayload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// A search hit. Scores are similarities: greater is better, and scores
/// within one result set are comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: ChunkPayload,
}

impl ScoredPoint {
    pub fn new(score: f32, payload: ChunkPayload) -> Self {
        Self { score, payload }
    }
}

/// Trait for vector store backends (Qdrant, in-memory, etc.)
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Search a collection for the points most similar to the vector,
    /// ordered by similarity descending, at most `limit` results.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError>;

    /// Write points to a collection. Point IDs are caller-assigned;
    /// re-writing an existing ID overwrites that point.
    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError>;

    /// List existing collection names.
    async fn list_collections(&self) -> Result<Vec<String>, DomainError>;

    /// Create a collection with the given vector dimension and metric.
    async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError>;
}
