use anyhow::Result;
use clap::Parser;
use sold_scraper::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sold_scraper=info")),
        )
        .init();

    let cli = Cli::parse();
    cli.run().await
}
