//! Command line arguments and terminal setup shared by the binaries

use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Serve the lines of a history log as JSON events
#[derive(Parser, Debug)]
#[command(name = "line-server")]
#[command(version)]
pub struct ServerArgs {
    /// History log written by the simulation
    #[arg(long, env = "HISTORY_FILE")]
    pub history: PathBuf,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 4444)]
    pub port: u16,

    /// Don't draw progress bars while scanning the history
    #[arg(long)]
    pub no_progress: bool,
}

/// Replay a history from a running line server
#[derive(Parser, Debug)]
#[command(name = "history-replay")]
#[command(version)]
pub struct ReplayArgs {
    /// Base url of the line server
    #[arg(long, default_value = "http://127.0.0.1:4444")]
    pub url: String,

    /// Replay at most this many lines
    #[arg(long)]
    pub limit: Option<usize>,

    /// How often to replay the history
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,
}

/// Log to stderr, filtered by `RUST_LOG` or `default_directives` if it isn't set
pub fn init_logging(default_directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A progress bar counting bytes, for indexing
pub fn bytes_progress(total: u64) -> anyhow::Result<ProgressBar> {
    progress(
        total,
        "Reading history |{bar:40.cyan}| {percent}% || {bytes}/{total_bytes}",
    )
}

/// A progress bar counting lines, for scanning
pub fn lines_progress(total: u64) -> anyhow::Result<ProgressBar> {
    progress(
        total,
        "Scanning pheromones |{bar:40.cyan}| {percent}% || {pos}/{len} lines",
    )
}

fn progress(total: u64, template: &str) -> anyhow::Result<ProgressBar> {
    let style = ProgressStyle::with_template(template)?.progress_chars("\u{2588}\u{2591}");
    Ok(ProgressBar::new(total).with_style(style))
}
