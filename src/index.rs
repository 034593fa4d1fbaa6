use async_std::io::{prelude::*, Read};
use itertools::Itertools;

use crate::{error::Error, Result};

/// Block size used when the filesystem doesn't tell us its preferred one
const DEFAULT_BLOCK_SIZE: u64 = 4096;

/// Amount of blocks read at once while building an index
const BLOCKS_PER_CHUNK: u64 = 4;

/// Returns the buffer size to use when scanning a file with the given metadata.
pub fn chunk_size(metadata: &std::fs::Metadata) -> usize {
    #[cfg(unix)]
    let block_size = {
        use std::os::unix::fs::MetadataExt;
        match metadata.blksize() {
            0 => DEFAULT_BLOCK_SIZE,
            n => n,
        }
    };

    #[cfg(not(unix))]
    let block_size = {
        let _ = metadata;
        DEFAULT_BLOCK_SIZE
    };

    (block_size * BLOCKS_PER_CHUNK) as usize
}

/// Contains an in-memory line-index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    /// Byte position of every `\n` in the file, in ascending order. The index within the Vec
    /// represents the line-index in the file.
    inner: Vec<u64>,
}

impl Index {
    /// Create a new Index out of already known newline positions. Expects `newlines` to be sorted.
    pub fn new(newlines: Vec<u64>) -> Index {
        Self { inner: newlines }
    }

    /// Build a new index for the first `total` bytes of `reader`, reading `chunk_size` bytes at
    /// once. `progress` gets called after each chunk with the amount of bytes read so far.
    pub async fn build<R, F>(
        reader: &mut R,
        total: u64,
        chunk_size: usize,
        mut progress: F,
    ) -> Result<Self>
    where
        R: Read + Unpin,
        F: FnMut(u64, u64),
    {
        let mut index = Index::default();
        let mut buff = vec![0u8; chunk_size.max(1)];
        let mut bytes_read: u64 = 0;

        while bytes_read < total {
            // Never look past the size we've been given, the file might grow while we're reading
            let want = (total - bytes_read).min(buff.len() as u64) as usize;
            let n = reader.read(&mut buff[..want]).await?;
            if n == 0 {
                return Err(Error::ShortRead {
                    offset: bytes_read,
                    expected: (total - bytes_read) as usize,
                    read: 0,
                });
            }

            index.push_chunk(&buff[..n], bytes_read);
            bytes_read += n as u64;
            progress(bytes_read, total);
        }

        Ok(index)
    }

    /// Build an index over data which is already in memory
    pub fn from_bytes(data: &[u8]) -> Index {
        let mut index = Index::default();
        index.push_chunk(data, 0);
        index
    }

    /// Record all newlines in `chunk`, which starts at `base` in the file
    fn push_chunk(&mut self, chunk: &[u8], base: u64) {
        self.inner.extend(
            chunk
                .iter()
                .positions(|b| *b == b'\n')
                .map(|pos| base + pos as u64),
        );
    }

    /// Get the position of the newline terminating `line`
    #[inline]
    pub fn get(&self, line: usize) -> Result<u64> {
        self.inner
            .get(line)
            .copied()
            .ok_or_else(|| self.out_of_bounds(line as i64))
    }

    /// Returns the byte range `start..end` of `line`, excluding its terminating newline.
    #[inline]
    pub fn range(&self, line: usize) -> Result<(u64, u64)> {
        let end = self.get(line)?;
        let start = match line {
            0 => 0,
            _ => self.inner[line - 1] + 1,
        };
        Ok((start, end))
    }

    /// Turns a possibly negative line number (eg. from a request) into a valid line-index.
    pub fn resolve(&self, line: i64) -> Result<usize> {
        if line < 0 || line >= self.len() as i64 {
            return Err(self.out_of_bounds(line));
        }
        Ok(line as usize)
    }

    fn out_of_bounds(&self, line: i64) -> Error {
        Error::OutOfBounds {
            line,
            lines: self.len() as i64,
        }
    }

    /// Returns the amount of lines which are terminated by a newline.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no newline has been found.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the amount of bytes covered by the index, i.e. the position right after the last
    /// newline.
    pub fn covered_bytes(&self) -> u64 {
        self.inner.last().map(|i| i + 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::io::Cursor;

    #[test]
    fn test_from_bytes() {
        let index = Index::from_bytes(b"ab\ncde\n\nf");
        assert_eq!(index, Index::new(vec![2, 6, 7]));
        assert_eq!(index.len(), 3);
        assert_eq!(index.range(0).unwrap(), (0, 2));
        assert_eq!(index.range(1).unwrap(), (3, 6));
        assert_eq!(index.range(2).unwrap(), (7, 7));
        assert!(index.range(3).is_err());
        assert_eq!(index.covered_bytes(), 8);
    }

    #[async_std::test]
    async fn test_build_small_chunks() {
        let data = b"ANTS,1,2\nBEST,1.5,0,1\n\nPHEROMONES,1.0,0-1:0.5\ntrailing";

        // Chunk sizes smaller than a line and unaligned to newlines must give the same result
        for chunk_size in [1, 2, 3, 7, 64] {
            let mut reader = Cursor::new(&data[..]);
            let mut calls = 0;
            let index = Index::build(&mut reader, data.len() as u64, chunk_size, |read, total| {
                assert!(read <= total);
                calls += 1;
            })
            .await
            .unwrap();

            assert_eq!(index, Index::from_bytes(data));
            assert!(calls > 0);
        }
    }

    #[async_std::test]
    async fn test_build_stops_at_total() {
        let data = b"a\nb\nc\n";
        let mut reader = Cursor::new(&data[..]);
        let index = Index::build(&mut reader, 4, 16, |_, _| {}).await.unwrap();
        assert_eq!(index.len(), 2);
    }

    #[async_std::test]
    async fn test_build_truncated() {
        let data = b"a\nb\n";
        let mut reader = Cursor::new(&data[..]);
        let res = Index::build(&mut reader, 10, 16, |_, _| {}).await;
        assert!(matches!(res, Err(Error::ShortRead { offset: 4, .. })));
    }

    #[test]
    fn test_resolve() {
        let index = Index::from_bytes(b"a\nb\nc\n");
        assert_eq!(index.resolve(0).unwrap(), 0);
        assert_eq!(index.resolve(2).unwrap(), 2);
        assert!(matches!(
            index.resolve(-1),
            Err(Error::OutOfBounds { line: -1, lines: 3 })
        ));
        assert!(matches!(
            index.resolve(3),
            Err(Error::OutOfBounds { line: 3, lines: 3 })
        ));
    }

    #[test]
    fn test_empty() {
        let index = Index::from_bytes(b"");
        assert!(index.is_empty());
        assert_eq!(index.covered_bytes(), 0);
        assert!(index.resolve(0).is_err());
    }
}
