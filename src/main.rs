use anyhow::Result;
use clap::Parser;

mod cli;
mod error;
mod launch;
mod lock;
mod naming;
mod orchestrator;
mod placeholder;
mod split;
mod tmux;
mod wm;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the session name
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    orchestrator::run(cli).await
}
