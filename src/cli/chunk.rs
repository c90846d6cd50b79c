//! Chunk command: segment regulation text files into a chunk record file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::domain::ingestion::Chunk;
use crate::infrastructure::services::ingestion::DocumentInput;
use crate::infrastructure::services::IngestionService;

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Directory of extracted regulation text files
    #[arg(long, default_value = "documents")]
    pub input_dir: PathBuf,

    /// Chunk record file to write
    #[arg(long, default_value = "chunks_output.json")]
    pub output: PathBuf,
}

pub async fn run(args: ChunkArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    super::init(&config);

    let service = super::ingestion_service(&config)?;
    let documents = read_documents(&args.input_dir)?;

    let (chunks, failed) = segment_documents(&service, &documents);

    let json = serde_json::to_string_pretty(&chunks)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        failed = failed.len(),
        output = %args.output.display(),
        "chunking complete"
    );

    if !failed.is_empty() {
        anyhow::bail!(
            "{} document(s) failed to segment: {}",
            failed.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

/// Segment each document, skipping unregistered sources and recording
/// failed ones without aborting the rest. Returns the chunks plus the
/// source identifiers that failed.
pub(crate) fn segment_documents(
    service: &IngestionService,
    documents: &[DocumentInput],
) -> (Vec<Chunk>, Vec<String>) {
    let mut chunks = Vec::new();
    let mut failed = Vec::new();

    for document in documents {
        match service.chunk_document(document) {
            Ok(Some(mut segmented)) => chunks.append(&mut segmented),
            Ok(None) => {
                warn!(source_file = %document.source_file, "source not registered, skipping")
            }
            Err(err) => {
                warn!(source_file = %document.source_file, error = %err, "segmentation failed");
                failed.push(document.source_file.clone());
            }
        }
    }

    (chunks, failed)
}

/// Read every regular file in the directory as one document. A trailing
/// `.txt` is stripped so `eu_dsa.pdf.txt` keys the registry as
/// `eu_dsa.pdf`.
pub(crate) fn read_documents(dir: &Path) -> anyhow::Result<Vec<DocumentInput>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read document directory {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let source_file = name.strip_suffix(".txt").unwrap_or(&name).to_string();
        let text = std::fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;

        documents.push(DocumentInput { source_file, text });
    }

    documents.sort_by(|a, b| a.source_file.cmp(&b.source_file));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::domain::ingestion::ChunkingConfig;
    use crate::domain::registry::SourceRegistry;
    use crate::domain::vector_store::mock::MockVectorStore;

    fn doc(source_file: &str, text: &str) -> DocumentInput {
        DocumentInput {
            source_file: source_file.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_segment_documents_skips_unregistered_and_continues() {
        let service = IngestionService::new(
            Arc::new(MockEmbeddingProvider::new(8)),
            Arc::new(MockVectorStore::new()),
            SourceRegistry::default(),
            ChunkingConfig::default(),
        )
        .unwrap();

        let documents = vec![
            doc("unknown.pdf", "Some text."),
            doc("eu_dsa.pdf", "Providers shall assess systemic risks."),
            doc("ncmec.pdf", "Reports must be submitted promptly."),
        ];

        let (chunks, failed) = segment_documents(&service, &documents);

        assert_eq!(chunks.len(), 2);
        assert!(failed.is_empty());
        assert_eq!(chunks[0].metadata.source_file, "eu_dsa.pdf");
        assert_eq!(chunks[1].metadata.source_file, "ncmec.pdf");
    }
}
