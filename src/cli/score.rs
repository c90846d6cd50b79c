//! Score command: batch-score a feature file and write a reward report.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::infrastructure::services::FeatureInput;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// JSON file of features to score
    #[arg(long)]
    pub input: PathBuf,

    /// Reward report file to write
    #[arg(long, default_value = "reward_report.json")]
    pub output: PathBuf,
}

pub async fn run(args: ScoreArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    super::init(&config);

    let service = super::analysis_service(&config)?;

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let features: Vec<FeatureInput> =
        serde_json::from_str(&raw).context("feature file is not valid JSON")?;

    let report = service.score_batch(features).await;

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        scored = report.scores.len(),
        failed = report.failures.len(),
        total_reward = report.total_reward,
        output = %args.output.display(),
        "scoring complete"
    );
    Ok(())
}
