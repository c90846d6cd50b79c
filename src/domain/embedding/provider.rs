//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for embedding providers (Ollama, OpenAI, etc.)
///
/// The model identity and vector dimension are pipeline-wide constants: a
/// provider's dimension must match the dimension every collection was
/// created with, otherwise cross-collection score comparison is meaningless.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding for the given text.
    ///
    /// An unreachable oracle or non-success status fails the single item;
    /// callers must not retry silently here (retry policy lives at the HTTP
    /// boundary).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the embedding model identifier
    fn model(&self) -> &str;

    /// Get the vector dimension this provider produces
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock embedding provider producing deterministic vectors
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            // Deterministic vector derived from the text bytes
            let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
            Ok((0..self.dimensions)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-embedding"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_dimension() {
            let provider = MockEmbeddingProvider::new(128);
            let vector = provider.embed("hello").await.unwrap();
            assert_eq!(vector.len(), 128);
        }

        #[tokio::test]
        async fn test_mock_provider_deterministic() {
            let provider = MockEmbeddingProvider::new(64);
            let a = provider.embed("same text").await.unwrap();
            let b = provider.embed("same text").await.unwrap();
            assert_eq!(a, b);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(64).with_error("unavailable");
            assert!(provider.embed("hello").await.is_err());
        }
    }
}
