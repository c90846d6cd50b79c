//! In-memory vector store for tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::vector_store::{DistanceMetric, ScoredPoint, StoredPoint, VectorStore};
use crate::domain::DomainError;

/// Cosine-similarity store held entirely in memory. Mirrors the collaborator
/// contract: a successful upsert is visible to subsequent searches, and
/// re-writing an existing point ID overwrites it.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredPoint>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let collections = self.collections.read().await;
        let points = collections
            .get(collection)
            .ok_or_else(|| DomainError::vector_store(format!("Unknown collection: {}", collection)))?;

        let mut hits: Vec<ScoredPoint> = points
            .iter()
            .map(|p| ScoredPoint::new(cosine_similarity(&p.vector, vector), p.payload.clone()))
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        Ok(hits)
    }

    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| DomainError::vector_store(format!("Unknown collection: {}", collection)))?;

        for point in points {
            if let Some(existing) = stored.iter_mut().find(|p| p.id == point.id) {
                *existing = point;
            } else {
                stored.push(point);
            }
        }

        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn create_collection(
        &self,
        name: &str,
        _dimensions: usize,
        _metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }
}
