//! Analyze command: run one feature through the full pipeline.

use clap::Args;

use crate::infrastructure::services::FeatureInput;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Feature name
    #[arg(long)]
    pub name: String,

    /// Feature description
    #[arg(long)]
    pub description: String,
}

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    super::init(&config);

    let service = super::analysis_service(&config)?;
    let analysis = service
        .analyze(&FeatureInput {
            feature_name: args.name,
            feature_description: args.description,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
