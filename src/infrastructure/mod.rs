pub mod chunkers;
pub mod embedding;
pub mod http;
pub mod llm;
pub mod logging;
pub mod services;
pub mod vector_store;
