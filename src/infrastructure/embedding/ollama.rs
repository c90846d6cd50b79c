//! Ollama embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "mxbai-embed-large";
const DEFAULT_DIMENSIONS: usize = 1024;

/// Embedding provider backed by a local Ollama server
#[derive(Debug)]
pub struct OllamaEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl<C: HttpClientTrait> OllamaEmbeddingProvider<C> {
    /// Create a provider with the default base URL and model
    pub fn new(client: C) -> Self {
        Self::with_config(
            client,
            DEFAULT_OLLAMA_BASE_URL,
            DEFAULT_EMBEDDING_MODEL,
            DEFAULT_DIMENSIONS,
        )
    }

    pub fn with_config(
        client: C,
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OllamaEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post_json(&self.embeddings_url(), vec![("Content-Type", "application/json")], &body)
            .await?;

        let parsed: OllamaEmbeddingResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse embedding response: {}", e))
        })?;

        if parsed.embedding.len() != self.dimensions {
            return Err(DomainError::provider(
                "ollama",
                format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    parsed.embedding.len()
                ),
            ));
        }

        Ok(parsed.embedding)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}
