//! CLI for the geo-regulatory compliance pipeline.
//!
//! Subcommands mirror the pipeline stages:
//! - `chunk`: segment extracted regulation text into a chunk record file
//! - `embed`: embed a chunk record file and upsert into the vector store
//! - `ingest`: chunk + embed in one pass
//! - `analyze`: run one feature through extraction, retrieval and both oracles
//! - `score`: batch-score a feature file and write a reward report

pub mod analyze;
pub mod chunk;
pub mod embed;
pub mod ingest;
pub mod score;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, VectorBackend};
use crate::domain::classification::{ClassificationRubric, DualClassifier};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::extraction::EntityExtractor;
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::retrieval::Retriever;
use crate::domain::vector_store::VectorStore;
use crate::infrastructure::embedding::OllamaEmbeddingProvider;
use crate::infrastructure::http::HttpClient;
use crate::infrastructure::llm::{GeminiChatProvider, OllamaChatProvider};
use crate::infrastructure::logging;
use crate::infrastructure::services::{AnalysisService, IngestionService};
use crate::infrastructure::vector_store::{InMemoryVectorStore, QdrantVectorStore};

/// Geo-regulatory compliance analysis pipeline
#[derive(Parser)]
#[command(name = "georeg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Segment regulation text files into a chunk record file
    Chunk(chunk::ChunkArgs),

    /// Embed a chunk record file and upsert it into the vector store
    Embed(embed::EmbedArgs),

    /// Chunk and embed regulation text files in one pass
    Ingest(ingest::IngestArgs),

    /// Analyze a single feature against the regulation corpora
    Analyze(analyze::AnalyzeArgs),

    /// Batch-score a feature file and write a reward report
    Score(score::ScoreArgs),
}

pub(crate) fn init(config: &AppConfig) {
    logging::init_logging(&config.logging);
}

pub(crate) fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::load().unwrap_or_default()
}

pub(crate) fn vector_store(config: &AppConfig) -> Arc<dyn VectorStore> {
    match config.vector_store.backend {
        VectorBackend::Qdrant => Arc::new(QdrantVectorStore::new(
            HttpClient::new(),
            config.qdrant.endpoint.clone(),
            config.qdrant.api_key.clone(),
        )),
        VectorBackend::Memory => Arc::new(InMemoryVectorStore::new()),
    }
}

pub(crate) fn embedder(config: &AppConfig) -> Arc<dyn EmbeddingProvider> {
    Arc::new(OllamaEmbeddingProvider::with_config(
        HttpClient::new(),
        config.ollama.base_url.clone(),
        config.ollama.embedding_model.clone(),
        config.ollama.embedding_dimensions,
    ))
}

pub(crate) fn ingestion_service(config: &AppConfig) -> anyhow::Result<IngestionService> {
    let registry = config.source_registry()?;
    let service = IngestionService::new(
        embedder(config),
        vector_store(config),
        registry,
        ChunkingConfig::new(config.ingestion.max_chunk_size),
    )?;
    Ok(service)
}

pub(crate) fn analysis_service(config: &AppConfig) -> anyhow::Result<AnalysisService> {
    let registry = config.source_registry()?;

    let ollama = Arc::new(
        OllamaChatProvider::new(HttpClient::new())
            .with_base_url(config.ollama.base_url.clone())
            .with_model(config.ollama.chat_model.clone()),
    );

    let gemini_key = config
        .gemini
        .api_key
        .clone()
        .context("gemini.api_key is required for analysis (set GEOREG__GEMINI__API_KEY)")?;
    let gemini = Arc::new(
        GeminiChatProvider::new(HttpClient::new(), gemini_key)
            .with_model(config.gemini.model.clone()),
    );

    let extractor = EntityExtractor::new(ollama.clone());
    let retriever = Retriever::new(vector_store(config), registry);
    let classifier = DualClassifier::new(ollama, gemini, ClassificationRubric::new());

    Ok(AnalysisService::new(extractor, embedder(config), retriever, classifier)
        .with_top_k(config.ingestion.top_k))
}
