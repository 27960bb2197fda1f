mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // .env first so env-backed flags see it.
    triage_core::config::load_dotenv();
    let cli = cli::Cli::parse();

    let config = cli.config();
    config.log_summary();

    cli::dispatch(cli.command, config).await
}
