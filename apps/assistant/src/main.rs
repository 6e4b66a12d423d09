use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpAssistantClient, SessionController};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

#[derive(Parser, Debug)]
#[command(name = "assistant", version, about = "Smart research assistant terminal client")]
struct Args {
    /// Base url of the research assistant backend.
    #[arg(long)]
    server_url: Option<String>,
    /// Config file; defaults to ./assistant.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Document to upload before the prompt opens.
    #[arg(long)]
    document: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    settings.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = HttpAssistantClient::new(&settings.server_url, settings.request_timeout())
        .context("failed to set up backend client")?;
    info!(server_url = client.server_url(), "research assistant client ready");

    let controller = SessionController::with_backend(Arc::new(client));
    repl::run(controller, args.document).await
}
