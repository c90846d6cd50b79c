//! Geo-regulatory compliance analysis pipeline.
//!
//! Segments regulation documents into chunks, embeds them into
//! per-jurisdiction vector collections, and scores product features by
//! running them through entity extraction, cross-collection retrieval and a
//! dual-oracle classifier whose agreement yields a reward signal.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
