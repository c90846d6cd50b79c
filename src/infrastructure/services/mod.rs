pub mod analysis;
pub mod ingestion;

pub use analysis::{AnalysisService, BatchReport, FeatureAnalysis, FeatureInput};
pub use ingestion::{DocumentInput, IngestionReport, IngestionService};
