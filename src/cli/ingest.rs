//! Ingest command: chunk and embed regulation text files in one pass.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use super::chunk::read_documents;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory of extracted regulation text files
    #[arg(long, default_value = "documents")]
    pub input_dir: PathBuf,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    super::init(&config);

    let service = super::ingestion_service(&config)?;
    let documents = read_documents(&args.input_dir)?;

    let report = service.ingest(documents).await?;

    info!(
        documents = report.documents_ingested,
        chunks = report.chunks_upserted,
        skipped = report.skipped_sources.len(),
        failed = report.failures.len(),
        "ingestion complete"
    );

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} document(s) failed to ingest: {}",
            report.failures.len(),
            report
                .failures
                .iter()
                .map(|f| f.source_file.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
