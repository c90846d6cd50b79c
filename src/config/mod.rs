mod app_config;

pub use app_config::{
    AppConfig, GeminiConfig, IngestionConfig, LogFormat, LoggingConfig, OllamaConfig, QdrantConfig,
    VectorBackend, VectorStoreConfig,
};
