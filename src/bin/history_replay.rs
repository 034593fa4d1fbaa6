//! history-replay entry point
//!
//! Plays a history back from a running line-server, the same way the map view does, and logs
//! every step.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use history_server::{
    cli::{self, ReplayArgs},
    client::RemoteHistory,
    playback::{PlaybackSession, Step},
    Event,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ReplayArgs::parse();
    cli::init_logging("history_server=info,history_replay=info");

    let remote = RemoteHistory::new(args.url.clone());
    let mut session = PlaybackSession::start(remote)
        .await
        .with_context(|| format!("can't reach line server at {}", args.url))?;
    if let Some(limit) = args.limit {
        session = session.limit(limit);
    }

    match session.bounds() {
        Some(bounds) => info!(lines = session.lines(), min = bounds.min, max = bounds.max, "starting replay"),
        None => info!(lines = session.lines(), "starting replay, history has no pheromone levels"),
    }

    for round in 0..args.repeat {
        session.reset();

        let mut iterations = 0;
        let mut best: Option<f64> = None;

        while let Some(step) = session.next_step().await? {
            match step {
                Step::Iteration(ants) => {
                    iterations += 1;
                    info!(iteration = iterations, moves = ants.len(), "ants moved");
                }
                Step::Event(Event::BestTour { length, tour }) => {
                    best = Some(length);
                    info!(length, cities = tour.len(), "new best tour");
                }
                Step::Event(Event::PheromoneLevels { trails, min, max, .. }) => {
                    info!(edges = trails.len(), ?min, ?max, "pheromone levels");
                }
                Step::Event(Event::AntPositions { positions }) => {
                    info!(ants = positions.len(), "ants moved");
                }
            }
        }

        info!(round, iterations, ?best, "replay finished");
    }

    Ok(())
}
