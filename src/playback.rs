//! Sequential replay of a history, one line after the other.

use itertools::Itertools;
use tracing::warn;

use crate::{bounds::PheromoneBounds, event::Event, history::EventSource, Result};

/// A unit of playback. Consecutive ant positions belong to the same iteration of the simulation
/// and get animated together.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A maximal run of consecutive ant position events
    Iteration(Vec<Vec<usize>>),
    /// Any other event, on its own
    Event(Event),
}

/// Groups maximal runs of consecutive `AntPositions` into a single `Step::Iteration`. Every other
/// event becomes its own step. Order is preserved.
pub fn group_ant_runs<I: IntoIterator<Item = Event>>(events: I) -> Vec<Step> {
    let groups = events.into_iter().group_by(Event::is_ant_positions);

    let mut steps = Vec::new();
    for (is_ants, group) in &groups {
        if is_ants {
            steps.push(Step::Iteration(group.filter_map(into_positions).collect()));
        } else {
            steps.extend(group.map(Step::Event));
        }
    }
    steps
}

fn into_positions(event: Event) -> Option<Vec<usize>> {
    match event {
        Event::AntPositions { positions } => Some(positions),
        _ => None,
    }
}

/// State of one replay of a history. Lines are fetched strictly in order, one request per line.
#[derive(Debug)]
pub struct PlaybackSession<S> {
    source: S,
    lines: usize,
    bounds: Option<PheromoneBounds>,
    /// Next line to fetch
    position: usize,
    /// Outcome of the line fetched while looking for the end of an iteration. Gets handed out by
    /// the next call.
    pending: Option<Result<Event>>,
}

impl<S: EventSource> PlaybackSession<S> {
    /// Start a new session by asking `source` for its line count and pheromone bounds.
    pub async fn start(source: S) -> Result<Self> {
        let lines = source.line_count().await?;
        let bounds = source.bounds().await?;

        Ok(Self {
            source,
            lines,
            bounds,
            position: 0,
            pending: None,
        })
    }

    /// Don't replay more than `limit` lines. Lines already fetched past the limit are dropped.
    pub fn limit(mut self, limit: usize) -> Self {
        self.lines = self.lines.min(limit);
        if self.position > self.lines {
            self.position = self.lines;
            self.pending = None;
        }
        self
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn lines(&self) -> usize {
        self.lines
    }

    #[inline]
    pub fn bounds(&self) -> Option<PheromoneBounds> {
        self.bounds
    }

    /// The next line which will be fetched
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Amount of lines which haven't been fetched yet
    #[inline]
    pub fn remaining(&self) -> usize {
        self.lines.saturating_sub(self.position)
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.pending.is_none() && self.position >= self.lines
    }

    /// Rewind to the first line for another replay
    pub fn reset(&mut self) {
        self.position = 0;
        self.pending = None;
    }

    /// Fetches the next event. Lines which don't contain a valid event (eg. blank lines) are
    /// skipped. Returns `None` once all lines have been replayed.
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(pending) = self.pending.take() {
            return pending.map(Some);
        }

        while self.position < self.lines {
            let line = self.position;
            self.position += 1;

            match self.source.event_at(line).await {
                Ok(event) => return Ok(Some(event)),
                Err(err) if err.is_unparsable() => warn!(line, %err, "skipping line"),
                Err(err) => return Err(err),
            }
        }

        Ok(None)
    }

    /// Fetches the next step, reading ahead until the current iteration ends.
    pub async fn next_step(&mut self) -> Result<Option<Step>> {
        let positions = match self.next_event().await? {
            Some(Event::AntPositions { positions }) => positions,
            Some(event) => return Ok(Some(Step::Event(event))),
            None => return Ok(None),
        };

        // An error ends the iteration too. The ants collected so far are still delivered and the
        // error is returned by the next call.
        let mut batch = vec![positions];
        loop {
            match self.next_event().await {
                Ok(Some(Event::AntPositions { positions })) => batch.push(positions),
                Ok(Some(other)) => {
                    self.pending = Some(Ok(other));
                    break;
                }
                Ok(None) => break,
                Err(err) => {
                    self.pending = Some(Err(err));
                    break;
                }
            }
        }

        Ok(Some(Step::Iteration(batch)))
    }
}
