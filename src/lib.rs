//!Index a large simulation history log by its lines and serve single lines as parsed events

/// Aggregated pheromone bounds over a whole history
pub mod bounds;
pub mod cli;
/// A thin HTTP client reading events from a running line server
pub mod client;
pub mod error;
/// Parsing of history lines into events
pub mod event;
/// A wrapper around async_std::fs::File which implements ReadByLine
pub mod file;
pub mod history;
/// The index of files
pub mod index;
pub mod playback;
pub mod server;
/// An indexed in-memory string
pub mod string;

pub use bounds::PheromoneBounds;
pub use event::Event;
pub use file::HistoryFile;
pub use history::{EventSource, History};
pub use string::IndexedString;

use async_trait::async_trait;
use index::Index;

pub type Result<T> = std::result::Result<T, error::Error>;

pub trait Indexable {
    /// Returns a reference to the files index.
    fn get_index(&self) -> &Index;

    /// Returns the total amount of newline terminated lines.
    #[inline]
    fn total_lines(&self) -> usize {
        self.get_index().len()
    }
}

/// A trait defining behavior for reading certain lines directly from indexed data. Reads only
/// need a shared reference so a single reader can serve concurrent requests.
#[async_trait]
pub trait ReadByLine: Indexable + Send + Sync {
    /// Reads the bytes of `line`, omitting the \n, and appends them to `buf`. Returns the amount
    /// of bytes read.
    async fn read_line_raw(&self, line: usize, buf: &mut Vec<u8>) -> Result<usize>;

    /// Reads the given line
    async fn read_line(&self, line: usize) -> Result<String> {
        let mut buf = Vec::new();
        self.read_line_raw(line, &mut buf).await?;
        Ok(String::from_utf8(buf)?)
    }
}
