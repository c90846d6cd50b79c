//! Document ingestion: segment, embed and upsert regulation corpora.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::ingestion::{Chunk, ChunkingConfig};
use crate::domain::registry::SourceRegistry;
use crate::domain::vector_store::{ChunkPayload, DistanceMetric, StoredPoint, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::chunkers::strategy_for;

/// A raw document handed to the pipeline: its registry key plus extracted
/// plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub source_file: String,
    pub text: String,
}

/// Aggregate outcome of an ingestion run. Per-document failures never abort
/// the run; they are collected here instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionReport {
    pub documents_ingested: usize,
    pub chunks_upserted: usize,
    pub skipped_sources: Vec<String>,
    pub failures: Vec<IngestionFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub source_file: String,
    pub error: String,
}

/// Deterministic point ID derived from the chunk's destination and text, so
/// re-running ingestion overwrites rather than duplicates.
pub fn point_id(collection: &str, text: &str) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Drives the segment -> embed -> upsert pipeline for registered sources.
pub struct IngestionService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    registry: SourceRegistry,
    chunking: ChunkingConfig,
}

impl IngestionService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        registry: SourceRegistry,
        chunking: ChunkingConfig,
    ) -> Result<Self, DomainError> {
        chunking.validate()?;
        Ok(Self {
            embedder,
            store,
            registry,
            chunking,
        })
    }

    /// Create every registered collection that does not exist yet, sized to
    /// the embedder's dimension. Returns the names that were created.
    pub async fn ensure_collections(&self) -> Result<Vec<String>, DomainError> {
        let existing = self.store.list_collections().await?;
        let mut created = Vec::new();

        for collection in self.registry.collections() {
            if existing.iter().any(|c| c == collection) {
                continue;
            }

            info!(collection, dimensions = self.embedder.dimensions(), "creating collection");
            self.store
                .create_collection(collection, self.embedder.dimensions(), DistanceMetric::Cosine)
                .await?;
            created.push(collection.to_string());
        }

        Ok(created)
    }

    /// Segment one document with the strategy its registry entry names.
    /// Returns `None` for sources the registry does not know.
    pub fn chunk_document(&self, document: &DocumentInput) -> Result<Option<Vec<Chunk>>, DomainError> {
        let Some(entry) = self.registry.resolve(&document.source_file) else {
            return Ok(None);
        };

        let strategy = strategy_for(entry.segmentation);
        let chunks = strategy.chunk(&document.text, &entry.source_file, &self.chunking)?;

        debug!(
            source_file = %entry.source_file,
            strategy = strategy.name(),
            chunks = chunks.len(),
            "document segmented"
        );
        Ok(Some(chunks))
    }

    /// Embed and upsert already-segmented chunks, grouped by destination
    /// collection. Chunks from unregistered sources are an error here: the
    /// segmentation step has already filtered them.
    pub async fn ingest_chunks(&self, chunks: Vec<Chunk>) -> Result<usize, DomainError> {
        let mut batches: BTreeMap<String, Vec<StoredPoint>> = BTreeMap::new();

        for chunk in chunks {
            let entry = self.registry.require(&chunk.metadata.source_file)?;
            let vector = self.embedder.embed(&chunk.text).await?;
            let id = point_id(&entry.collection, &chunk.text);
            batches
                .entry(entry.collection.clone())
                .or_default()
                .push(StoredPoint::new(id, vector, ChunkPayload::from(chunk)));
        }

        let mut upserted = 0;
        for (collection, points) in batches {
            upserted += points.len();
            debug!(collection = %collection, points = points.len(), "upserting batch");
            self.store.upsert(&collection, points).await?;
        }

        Ok(upserted)
    }

    /// Full ingestion run. Unmapped sources are skipped with a warning, and
    /// a document whose embedding or upsert fails is recorded without
    /// aborting the rest of the run.
    pub async fn ingest(&self, documents: Vec<DocumentInput>) -> Result<IngestionReport, DomainError> {
        self.ensure_collections().await?;

        let mut report = IngestionReport::default();

        for document in documents {
            let chunks = match self.chunk_document(&document) {
                Ok(Some(chunks)) => chunks,
                Ok(None) => {
                    warn!(source_file = %document.source_file, "source not registered, skipping");
                    report.skipped_sources.push(document.source_file);
                    continue;
                }
                Err(err) => {
                    report.failures.push(IngestionFailure {
                        source_file: document.source_file,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            match self.ingest_chunks(chunks).await {
                Ok(count) => {
                    report.documents_ingested += 1;
                    report.chunks_upserted += count;
                }
                Err(err) => {
                    warn!(source_file = %document.source_file, error = %err, "ingestion failed");
                    report.failures.push(IngestionFailure {
                        source_file: document.source_file,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            documents = report.documents_ingested,
            chunks = report.chunks_upserted,
            skipped = report.skipped_sources.len(),
            failed = report.failures.len(),
            "ingestion run complete"
        );
        Ok(report)
    }
}
