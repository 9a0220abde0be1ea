use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use oiwatch::application::{Cli, CommandExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with the countdown on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    CommandExecutor::execute(cli).await
}
