use clap::Parser;
use georeg::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Chunk(args) => cli::chunk::run(args).await,
        Command::Embed(args) => cli::embed::run(args).await,
        Command::Ingest(args) => cli::ingest::run(args).await,
        Command::Analyze(args) => cli::analyze::run(args).await,
        Command::Score(args) => cli::score::run(args).await,
    }
}
