//! A history log together with everything computed about it at startup.

use async_std::path::Path;
use async_trait::async_trait;
use tracing::info;

use crate::{
    bounds::{self, PheromoneBounds},
    event::Event,
    file::HistoryFile,
    index::Index,
    Indexable, ReadByLine, Result,
};

/// Anything events can be replayed from, be it a local file or a remote server.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Total amount of lines
    async fn line_count(&self) -> Result<usize>;

    /// Bounds over all pheromone levels, `None` if there are none
    async fn bounds(&self) -> Result<Option<PheromoneBounds>>;

    /// The parsed event at `line`
    async fn event_at(&self, line: usize) -> Result<Event>;
}

/// An indexed history and its pheromone bounds. Built once, read-only afterwards.
#[derive(Debug)]
pub struct History<S> {
    reader: S,
    bounds: Option<PheromoneBounds>,
}

impl History<HistoryFile> {
    /// Open and index the file at `path`, then scan it for pheromone bounds.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = HistoryFile::open(path).await?;
        History::load(file).await
    }
}

impl<S: ReadByLine> History<S> {
    /// Scans `reader` for pheromone bounds.
    pub async fn load(reader: S) -> Result<Self> {
        let bounds = bounds::scan(&reader).await?;
        Ok(Self::with_bounds(reader, bounds))
    }

    /// Uses already known bounds
    pub fn with_bounds(reader: S, bounds: Option<PheromoneBounds>) -> Self {
        match bounds {
            Some(b) => info!(lines = reader.total_lines(), min = b.min, max = b.max, "history ready"),
            None => info!(lines = reader.total_lines(), "history ready, no pheromone levels found"),
        }
        Self { reader, bounds }
    }

    #[inline]
    pub fn reader(&self) -> &S {
        &self.reader
    }

    #[inline]
    pub fn pheromone_bounds(&self) -> Option<PheromoneBounds> {
        self.bounds
    }

    #[inline]
    pub fn lines(&self) -> usize {
        self.reader.total_lines()
    }

    /// Read and parse a single line
    pub async fn event(&self, line: usize) -> Result<Event> {
        let raw = self.reader.read_line(line).await?;
        Event::parse(&raw)
    }
}

impl<S: ReadByLine> Indexable for History<S> {
    #[inline]
    fn get_index(&self) -> &Index {
        self.reader.get_index()
    }
}

#[async_trait]
impl<S: ReadByLine> EventSource for History<S> {
    async fn line_count(&self) -> Result<usize> {
        Ok(self.lines())
    }

    async fn bounds(&self) -> Result<Option<PheromoneBounds>> {
        Ok(self.bounds)
    }

    async fn event_at(&self, line: usize) -> Result<Event> {
        self.event(line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[async_std::test]
    async fn test_open() {
        let history = History::open("./testfiles/history").await.unwrap();
        assert_eq!(history.lines(), 10);
        assert_eq!(
            history.pheromone_bounds(),
            Some(PheromoneBounds { min: 0.02, max: 0.5 })
        );
        assert_eq!(
            history.event(0).await.unwrap(),
            Event::AntPositions {
                positions: vec![0, 1, 2]
            }
        );
        assert!(matches!(
            history.event(10).await,
            Err(Error::OutOfBounds { line: 10, lines: 10 })
        ));
    }

    #[async_std::test]
    async fn test_open_missing() {
        let res = History::open("./testfiles/does_not_exist").await;
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
