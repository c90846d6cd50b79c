use serde::Deserialize;

use crate::domain::registry::{SourceEntry, SourceRegistry};
use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Overrides the built-in source registry when non-empty
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub backend: VectorBackend,
}

/// Which vector store implementation to run against. `memory` holds points
/// for the lifetime of one process, enough for smoke runs without a Qdrant
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chat_model: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiConfig {
    /// Required for the analyze and score commands
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    pub max_chunk_size: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vector_store: VectorStoreConfig::default(),
            qdrant: QdrantConfig::default(),
            ollama: OllamaConfig::default(),
            gemini: GeminiConfig::default(),
            ingestion: IngestionConfig::default(),
            sources: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:6333".to_string(),
            api_key: None,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            embedding_dimensions: 1024,
            chat_model: "llama3.1".to_string(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
            top_k: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("GEOREG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// The source registry this configuration describes: the configured
    /// entries when present, the built-in jurisdictions otherwise.
    pub fn source_registry(&self) -> Result<SourceRegistry, DomainError> {
        if self.sources.is_empty() {
            Ok(SourceRegistry::default())
        } else {
            SourceRegistry::new(self.sources.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.vector_store.backend, VectorBackend::Qdrant);
        assert_eq!(config.qdrant.endpoint, "http://127.0.0.1:6333");
        assert_eq!(config.ollama.embedding_model, "mxbai-embed-large");
        assert_eq!(config.ollama.embedding_dimensions, 1024);
        assert_eq!(config.ingestion.max_chunk_size, 800);
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_empty_sources_yield_builtin_registry() {
        let registry = AppConfig::default().source_registry().unwrap();
        assert_eq!(registry.len(), 5);
        assert!(registry.resolve("eu_dsa.pdf").is_some());
    }

    #[test]
    fn test_configured_sources_replace_builtin_registry() {
        let config = AppConfig {
            sources: vec![SourceEntry::new("custom.pdf", "custom_regulation", "XX")],
            ..AppConfig::default()
        };

        let registry = config.source_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("eu_dsa.pdf").is_none());
    }

    #[test]
    fn test_vector_backend_selection_deserializes() {
        let raw = r#"
            [vector_store]
            backend = "memory"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.vector_store.backend, VectorBackend::Memory);
    }

    #[test]
    fn test_config_deserializes_from_toml() {
        let raw = r#"
            [qdrant]
            endpoint = "http://qdrant.internal:6333"
            api_key = "secret"

            [logging]
            level = "debug"
            format = "json"

            [[sources]]
            source_file = "eu_dsa.pdf"
            collection = "eu_regulation"
            region = "EU"

            [[sources]]
            source_file = "utah_regulation_act.pdf"
            collection = "ut_regulation"
            region = "UT"
            segmentation = "numbered_clause"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.qdrant.endpoint, "http://qdrant.internal:6333");
        assert_eq!(config.qdrant.api_key.as_deref(), Some("secret"));
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.sources.len(), 2);

        let registry = config.source_registry().unwrap();
        assert_eq!(
            registry.resolve("utah_regulation_act.pdf").unwrap().segmentation,
            crate::domain::registry::SegmentationKind::NumberedClause
        );
    }
}
