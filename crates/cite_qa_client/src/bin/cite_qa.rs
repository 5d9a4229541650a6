//! cite-qa: one-shot binary for cited Q&A.
//! Reads config, sends the question (argument or first stdin line) to the ask
//! endpoint, prints the answer and its citations to stdout.

use anyhow::Context;
use cite_qa_client::{config, logging, Client, Config, ConfigError, QueryOutput};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "cite-qa", about = "Ask a question and print the cited answer")]
struct Args {
    /// Config file (default: $CITE_QA_CONFIG or ~/.cite-qa/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override api.base_url
    #[arg(long)]
    base_url: Option<String>,

    /// Write the effective config to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Question to ask; read from stdin when omitted
    question: Option<String>,
}

fn read_question(arg: Option<String>) -> String {
    match arg {
        Some(q) => q.trim().to_string(),
        None => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).unwrap_or(0);
            line.trim().to_string()
        }
    }
}

fn print_output(output: &QueryOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", output.response)?;
    if !output.citations.is_empty() {
        writeln!(out, "\nCitations:")?;
        for citation in &output.citations {
            writeln!(out, "  [{}] {}", citation.number, citation.text)?;
        }
    }
    out.flush()
}

fn run(args: Args) -> anyhow::Result<()> {
    let source = config::resolve_config_path(args.config.as_deref())?;
    let mut cfg = match config::load_from(&source) {
        // --init-config may target a file that does not exist yet.
        Err(ConfigError::NotFound(_)) if args.init_config => Config::default(),
        result => result
            .with_context(|| format!("failed to load config from {}", source.path().display()))?,
    };
    if let Some(url) = args.base_url {
        cfg.api.base_url = Some(url);
    }

    logging::init_stderr(cfg.log.level.as_deref());

    if args.init_config {
        config::save(source.path(), &cfg.with_defaults())?;
        println!("Wrote {}", source.path().display());
        return Ok(());
    }

    let question = read_question(args.question);
    if question.is_empty() {
        anyhow::bail!("no question provided (pass it as an argument or on stdin)");
    }

    let client = Client::from_config(&cfg)?;

    // One request; a current-thread runtime is enough.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    match rt.block_on(client.ask(&question)) {
        Ok(output) => {
            print_output(&output)?;
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message()),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
