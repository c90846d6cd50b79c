//! Feature analysis: entity extraction, retrieval, dual classification and
//! agreement scoring for one feature or a batch of them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chrono::{DateTime, Utc};

use crate::domain::classification::{DualClassification, DualClassifier, Label};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::extraction::{EntityExtractor, ExtractedEntities};
use crate::domain::retrieval::{CollectionMatch, Retriever};
use crate::domain::reward::RewardRecord;
use crate::domain::DomainError;

pub const DEFAULT_TOP_K: usize = 3;

/// One feature to analyze. Field names follow the batch input format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureInput {
    pub feature_name: String,
    pub feature_description: String,
}

/// Ranked retrieval summary kept in the report, without the full hit texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub collection: String,
    pub source_file: String,
    pub score: f32,
}

impl From<&CollectionMatch> for MatchSummary {
    fn from(m: &CollectionMatch) -> Self {
        Self {
            collection: m.collection.clone(),
            source_file: m.source_file.clone(),
            score: m.score,
        }
    }
}

/// Full report for one analyzed feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureAnalysis {
    pub feature_name: String,
    pub entities: ExtractedEntities,
    pub matches: Vec<MatchSummary>,
    pub regulation_context: String,
    pub classification: DualClassification,
    pub reward: RewardRecord,
}

/// One row of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFeature {
    pub feature_name: String,
    pub primary_label: Label,
    pub oracle_label: Label,
    pub reward: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub feature_name: String,
    pub error: String,
}

/// Aggregate batch report. Per-feature failures never abort the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub scores: Vec<ScoredFeature>,
    pub failures: Vec<BatchFailure>,
    pub total_reward: i32,
}

/// Orchestrates the per-feature pipeline: extract entities and embed the
/// description, retrieve regulation context, classify with both oracles,
/// score the agreement.
pub struct AnalysisService {
    extractor: EntityExtractor,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    classifier: DualClassifier,
    top_k: usize,
}

impl AnalysisService {
    pub fn new(
        extractor: EntityExtractor,
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: Retriever,
        classifier: DualClassifier,
    ) -> Self {
        Self {
            extractor,
            embedder,
            retriever,
            classifier,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Analyze a single feature end to end.
    ///
    /// Extraction and embedding run concurrently; the extracted location
    /// narrows retrieval to one jurisdiction when it names a known region.
    /// An empty retrieval result does not stop classification.
    pub async fn analyze(&self, feature: &FeatureInput) -> Result<FeatureAnalysis, DomainError> {
        let (entities, vector) = tokio::join!(
            self.extractor
                .extract(&feature.feature_name, &feature.feature_description),
            self.embedder.embed(&feature.feature_description),
        );
        let entities = entities?;
        let vector = vector?;

        let matches = if entities.location.trim().is_empty() {
            self.retriever.retrieve_best(&vector, self.top_k).await?
        } else {
            self.retriever
                .retrieve_for_location(&vector, &entities.location, self.top_k)
                .await?
        };

        let regulation_context = matches
            .first()
            .map(|m| m.texts.join("\n\n"))
            .unwrap_or_default();

        if regulation_context.is_empty() {
            warn!(feature = %feature.feature_name, "no regulation context retrieved");
        }

        let classification = self
            .classifier
            .classify(&entities, &regulation_context)
            .await?;
        let reward = RewardRecord::new(
            classification.primary.classification,
            classification.secondary.classification,
        );

        info!(
            feature = %feature.feature_name,
            primary = %classification.primary.classification,
            secondary = %classification.secondary.classification,
            reward = reward.reward,
            "feature analyzed"
        );

        Ok(FeatureAnalysis {
            feature_name: feature.feature_name.clone(),
            entities,
            matches: matches.iter().map(MatchSummary::from).collect(),
            regulation_context,
            classification,
            reward,
        })
    }

    /// Score a batch of features. A feature whose analysis fails is recorded
    /// and the run continues.
    pub async fn score_batch(&self, features: Vec<FeatureInput>) -> BatchReport {
        let mut report = BatchReport {
            generated_at: Utc::now(),
            ..BatchReport::default()
        };

        for feature in features {
            match self.analyze(&feature).await {
                Ok(analysis) => {
                    report.total_reward += analysis.reward.reward;
                    report.scores.push(ScoredFeature {
                        feature_name: analysis.feature_name,
                        primary_label: analysis.reward.primary_label,
                        oracle_label: analysis.reward.oracle_label,
                        reward: analysis.reward.reward,
                    });
                }
                Err(err) => {
                    warn!(feature = %feature.feature_name, error = %err, "feature analysis failed");
                    report.failures.push(BatchFailure {
                        feature_name: feature.feature_name,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            scored = report.scores.len(),
            failed = report.failures.len(),
            total_reward = report.total_reward,
            "batch scoring complete"
        );
        report
    }
}
