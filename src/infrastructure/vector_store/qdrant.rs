//! Qdrant vector store over its REST API

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::vector_store::{
    ChunkPayload, DistanceMetric, ScoredPoint, StoredPoint, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

/// Qdrant-backed vector store
#[derive(Debug)]
pub struct QdrantVectorStore<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: Option<String>,
}

impl<C: HttpClientTrait> QdrantVectorStore<C> {
    pub fn new(client: C, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref key) = self.api_key {
            headers.push(("api-key", key.as_str()));
        }
        headers
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}", self.base_url, collection)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for QdrantVectorStore<C> {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let url = format!("{}/points/search", self.collection_url(collection));
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let parsed: QdrantSearchResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::vector_store(format!("Failed to parse search response: {}", e))
        })?;

        Ok(parsed
            .result
            .into_iter()
            .map(|hit| ScoredPoint::new(hit.score, hit.payload))
            .collect())
    }

    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<(), DomainError> {
        let url = format!("{}/points", self.collection_url(collection));
        let body = serde_json::json!({
            "points": points
                .iter()
                .map(|p| serde_json::json!({
                    "id": p.id,
                    "vector": p.vector,
                    "payload": p.payload,
                }))
                .collect::<Vec<_>>(),
        });

        self.client.put_json(&url, self.headers(), &body).await?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let url = format!("{}/collections", self.base_url);
        let response = self.client.get_json(&url, self.headers()).await?;

        let parsed: QdrantCollectionsResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::vector_store(format!("Failed to parse collections response: {}", e))
        })?;

        Ok(parsed
            .result
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        let url = self.collection_url(name);
        let body = serde_json::json!({
            "vectors": {
                "size": dimensions,
                "distance": metric,
            },
        });

        self.client.put_json(&url, self.headers(), &body).await?;
        Ok(())
    }
}

// Qdrant API types

#[derive(Debug, Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantHit>,
}

#[derive(Debug, Deserialize)]
struct QdrantHit {
    score: f32,
    payload: ChunkPayload,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionsResponse {
    result: QdrantCollections,
}

#[derive(Debug, Deserialize)]
struct QdrantCollections {
    collections: Vec<QdrantCollectionInfo>,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionInfo {
    name: String,
}
