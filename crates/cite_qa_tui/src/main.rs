//! cite-qa-tui: interactive terminal chat against the cited Q&A backend.

use anyhow::Context;
use cite_qa_client::{config, logging, Client};
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "cite-qa-tui", about = "Chat with the cited Q&A backend")]
struct Args {
    /// Config file (default: $CITE_QA_CONFIG or ~/.cite-qa/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override api.base_url
    #[arg(long)]
    base_url: Option<String>,
}

fn run(args: Args) -> anyhow::Result<()> {
    let source = config::resolve_config_path(args.config.as_deref())?;
    let mut cfg = config::load_from(&source)
        .with_context(|| format!("failed to load config from {}", source.path().display()))?;
    if let Some(url) = args.base_url {
        cfg.api.base_url = Some(url);
    }

    // The screen belongs to the UI, so logs only go to a file when one is configured.
    if let Some(path) = cfg.log.file.as_deref() {
        logging::init_file(cfg.log.level.as_deref(), path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
    }

    let client = Client::from_config(&cfg)?;
    tracing::info!(endpoint = %client.endpoint(), "starting chat");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;
    rt.block_on(cite_qa_tui::run(client))
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
