//! Tracing setup for the binaries.
//!
//! Filter precedence: `CITE_QA_LOG`, then the configured `log.level`, then `warn`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Env var holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "CITE_QA_LOG";

const DEFAULT_LEVEL: &str = "warn";

fn filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(DEFAULT_LEVEL)))
}

/// Log to stderr, keeping stdout for answers.
pub fn init_stderr(level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Append logs to `path`. Used where the terminal is owned by the UI.
pub fn init_file(level: Option<&str>, path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
