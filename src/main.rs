//! line-server entry point
//!
//! Indexes a history log, scans it once for pheromone bounds and then serves its lines over HTTP.
//!
//! ```bash
//! line-server --history history.log
//! line-server --history history.log --host 0.0.0.0 --port 8080
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use history_server::{
    bounds,
    cli::{self, ServerArgs},
    server, History, HistoryFile, Indexable,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    cli::init_logging("history_server=info,line_server=info");

    let path = async_std::path::PathBuf::from(args.history.clone());

    let bar = if args.no_progress {
        None
    } else {
        Some(cli::bytes_progress(0)?)
    };
    let file = HistoryFile::open_with_progress(&path, |read, total| {
        if let Some(bar) = &bar {
            bar.set_length(total);
            bar.set_position(read);
        }
    })
    .await
    .with_context(|| format!("can't read history {}", args.history.display()))?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    info!(lines = file.total_lines(), "found lines");

    let bar = if args.no_progress {
        None
    } else {
        Some(cli::lines_progress(file.total_lines() as u64)?)
    };
    let bounds = bounds::scan_with_progress(&file, |line, _| {
        if let Some(bar) = &bar {
            bar.set_position(line as u64);
        }
    })
    .await
    .with_context(|| format!("can't scan history {}", args.history.display()))?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let history = Arc::new(History::with_bounds(file, bounds));

    let listener = TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("can't listen on {}:{}", args.host, args.port))?;

    server::serve(listener, history).await?;
    Ok(())
}
