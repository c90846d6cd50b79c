//! Embed command: embed a chunk record file and upsert into the store.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::ingestion::Chunk;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Chunk record file produced by the chunk command
    #[arg(long, default_value = "chunks_output.json")]
    pub input: PathBuf,
}

pub async fn run(args: EmbedArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    super::init(&config);

    let service = super::ingestion_service(&config)?;

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let chunks: Vec<Chunk> =
        serde_json::from_str(&raw).context("chunk record file is not valid JSON")?;

    let created = service.ensure_collections().await?;
    if !created.is_empty() {
        info!(created = ?created, "created missing collections");
    }

    let upserted = service.ingest_chunks(chunks).await?;
    info!(chunks = upserted, "embedding complete");
    Ok(())
}
