//! Domain layer: pure types, traits, and pipeline algorithms

pub mod classification;
pub mod embedding;
pub mod extraction;
pub mod ingestion;
pub mod llm;
pub mod registry;
pub mod retrieval;
pub mod reward;
pub mod vector_store;

mod error;

pub use error::DomainError;
