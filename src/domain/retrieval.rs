//! Cross-collection ranked retrieval

use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::registry::SourceRegistry;
use crate::domain::vector_store::{ScoredPoint, VectorStore};
use crate::domain::DomainError;

/// One collection's contribution to a fan-out query, ranked by its top hit.
#[derive(Debug, Clone)]
pub struct CollectionMatch {
    pub collection: String,
    pub source_file: String,
    /// Hit texts in similarity order
    pub texts: Vec<String>,
    /// The top hit's similarity score
    pub score: f32,
}

/// Issues similarity queries against the registry's collections and ranks
/// results across them.
#[derive(Debug, Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    registry: SourceRegistry,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, registry: SourceRegistry) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Targeted retrieval against one collection, ordered by similarity
    /// descending.
    pub async fn retrieve(
        &self,
        vector: &[f32],
        collection: &str,
        k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        self.store.search(collection, vector, k).await
    }

    /// Targeted retrieval keyed by source identifier. An unmapped source is
    /// a user-facing configuration error.
    pub async fn retrieve_for_source(
        &self,
        vector: &[f32],
        source_file: &str,
        k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let entry = self.registry.require(source_file)?;
        self.retrieve(vector, &entry.collection, k).await
    }

    /// Best-match retrieval across every registered collection.
    ///
    /// Each collection is queried concurrently with the same vector and k.
    /// A collection that fails is logged and treated as empty; empty
    /// collections are dropped. The remaining collections are ranked by
    /// their top hit's score, descending, with ties broken by registry
    /// order (the sort is stable).
    pub async fn retrieve_best(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<CollectionMatch>, DomainError> {
        let queries = self.registry.entries().iter().map(|entry| {
            let store = Arc::clone(&self.store);
            async move {
                let result = store.search(&entry.collection, vector, k).await;
                (entry, result)
            }
        });

        let mut matches = Vec::with_capacity(self.registry.len());
        for (entry, result) in join_all(queries).await {
            let points = match result {
                Ok(points) => points,
                Err(err) => {
                    warn!(
                        collection = %entry.collection,
                        error = %err,
                        "collection query failed, excluding from ranking"
                    );
                    continue;
                }
            };

            if let Some(m) = Self::collection_match(entry.collection.clone(), entry.source_file.clone(), points) {
                matches.push(m);
            }
        }

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        debug!(collections = matches.len(), "fan-out retrieval ranked");
        Ok(matches)
    }

    /// Location-guided retrieval: when the location token matches a
    /// registered region label, only that collection is queried; otherwise
    /// this falls back to the full fan-out.
    pub async fn retrieve_for_location(
        &self,
        vector: &[f32],
        location: &str,
        k: usize,
    ) -> Result<Vec<CollectionMatch>, DomainError> {
        let Some(entry) = self.registry.entry_for_region(location) else {
            return self.retrieve_best(vector, k).await;
        };

        debug!(region = %entry.region, collection = %entry.collection, "location-guided retrieval");
        let points = self.store.search(&entry.collection, vector, k).await?;

        Ok(Self::collection_match(entry.collection.clone(), entry.source_file.clone(), points)
            .into_iter()
            .collect())
    }

    fn collection_match(
        collection: String,
        source_file: String,
        points: Vec<ScoredPoint>,
    ) -> Option<CollectionMatch> {
        let score = points.first()?.score;
        let texts: Vec<String> = points
            .into_iter()
            .map(|p| p.payload.text)
            .filter(|t| !t.is_empty())
            .collect();

        if texts.is_empty() {
            return None;
        }

        Some(CollectionMatch {
            collection,
            source_file,
            texts,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{SourceEntry, SourceRegistry};
    use crate::domain::vector_store::mock::MockVectorStore;

    fn three_collection_registry() -> SourceRegistry {
        SourceRegistry::new(vec![
            SourceEntry::new("a.pdf", "col_a", "AA"),
            SourceEntry::new("b.pdf", "col_b", "BB"),
            SourceEntry::new("c.pdf", "col_c", "CC"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_best_ranks_by_top_score_and_drops_empty() {
        let store = MockVectorStore::new()
            .with_results("col_a", vec![MockVectorStore::point(0.9, "a1", "a.pdf")])
            .with_results(
                "col_b",
                vec![
                    MockVectorStore::point(0.7, "b1", "b.pdf"),
                    MockVectorStore::point(0.6, "b2", "b.pdf"),
                ],
            );
        let retriever = Retriever::new(Arc::new(store), three_collection_registry());

        let matches = retriever.retrieve_best(&[0.0], 3).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].collection, "col_a");
        assert_eq!(matches[0].score, 0.9);
        assert_eq!(matches[1].collection, "col_b");
        assert_eq!(matches[1].texts, vec!["b1", "b2"]);
    }

    #[tokio::test]
    async fn test_retrieve_best_tie_break_is_registry_order() {
        let store = MockVectorStore::new()
            .with_results("col_a", vec![MockVectorStore::point(0.5, "a1", "a.pdf")])
            .with_results("col_b", vec![MockVectorStore::point(0.5, "b1", "b.pdf")])
            .with_results("col_c", vec![MockVectorStore::point(0.5, "c1", "c.pdf")]);
        let retriever = Retriever::new(Arc::new(store), three_collection_registry());

        let matches = retriever.retrieve_best(&[0.0], 3).await.unwrap();

        let order: Vec<_> = matches.iter().map(|m| m.collection.as_str()).collect();
        assert_eq!(order, vec!["col_a", "col_b", "col_c"]);
    }

    #[tokio::test]
    async fn test_retrieve_best_isolates_collection_failure() {
        let store = MockVectorStore::new()
            .with_results("col_a", vec![MockVectorStore::point(0.4, "a1", "a.pdf")])
            .with_failing_collection("col_b")
            .with_results("col_c", vec![MockVectorStore::point(0.8, "c1", "c.pdf")]);
        let retriever = Retriever::new(Arc::new(store), three_collection_registry());

        let matches = retriever.retrieve_best(&[0.0], 3).await.unwrap();

        let order: Vec<_> = matches.iter().map(|m| m.collection.as_str()).collect();
        assert_eq!(order, vec!["col_c", "col_a"]);
    }

    #[tokio::test]
    async fn test_location_guided_queries_only_matching_collection() {
        let registry = SourceRegistry::default();
        let store = MockVectorStore::new().with_results(
            "ut_regulation",
            vec![MockVectorStore::point(0.6, "utah clause", "utah_regulation_act.pdf")],
        );
        let store = Arc::new(store);
        let retriever = Retriever::new(Arc::clone(&store) as Arc<dyn VectorStore>, registry);

        let matches = retriever.retrieve_for_location(&[0.0], "UT", 3).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].collection, "ut_regulation");
        assert_eq!(store.search_count("ut_regulation"), 1);
        for other in ["eu_regulation", "fl_regulation", "ncmec_regulation", "ca_regulation"] {
            assert_eq!(store.search_count(other), 0, "{other} should not be queried");
        }
    }

    #[tokio::test]
    async fn test_unknown_location_falls_back_to_fan_out() {
        let registry = SourceRegistry::default();
        let store = Arc::new(MockVectorStore::new());
        let retriever = Retriever::new(Arc::clone(&store) as Arc<dyn VectorStore>, registry);

        let matches = retriever
            .retrieve_for_location(&[0.0], "Atlantis", 3)
            .await
            .unwrap();

        assert!(matches.is_empty());
        assert_eq!(store.search_count("eu_regulation"), 1);
        assert_eq!(store.search_count("ca_regulation"), 1);
    }

    #[tokio::test]
    async fn test_retrieve_for_source_unmapped_is_configuration_error() {
        let store = Arc::new(MockVectorStore::new());
        let retriever = Retriever::new(store, SourceRegistry::default());

        let err = retriever
            .retrieve_for_source(&[0.0], "nope.pdf", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
