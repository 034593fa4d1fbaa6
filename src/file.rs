use std::io::SeekFrom;

use async_std::{
    fs,
    io::{prelude::*, Read},
    path::Path,
    sync::Mutex,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::Error,
    index::{self, Index},
    Indexable, ReadByLine, Result,
};

/// A wrapper around `async_std::fs::File` which implements `ReadByLine` and holds an index of the
/// lines. The index is built once when opening; content appended afterwards stays invisible.
#[derive(Debug)]
pub struct HistoryFile {
    inner_file: Mutex<fs::File>,
    index: Index,
}

impl HistoryFile {
    /// Open a file and build its index.
    ///
    /// Returns an error if the file can't be opened or read
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<HistoryFile> {
        Self::open_with_progress(path, |_, _| {}).await
    }

    /// Same as `open` but calls `progress` with the amount of bytes scanned and the total file
    /// size after every chunk.
    pub async fn open_with_progress<P, F>(path: P, progress: F) -> Result<HistoryFile>
    where
        P: AsRef<Path>,
        F: FnMut(u64, u64),
    {
        let path = path.as_ref();
        let mut inner_file = fs::File::open(path).await?;

        let metadata = inner_file.metadata().await?;
        let chunk_size = index::chunk_size(&metadata);
        let index = Index::build(&mut inner_file, metadata.len(), chunk_size, progress).await?;

        debug!(
            path = %path.display(),
            bytes = metadata.len(),
            lines = index.len(),
            "indexed history file"
        );

        Ok(Self {
            inner_file: Mutex::new(inner_file),
            index,
        })
    }
}

impl Indexable for HistoryFile {
    #[inline]
    fn get_index(&self) -> &Index {
        &self.index
    }
}

#[async_trait]
impl ReadByLine for HistoryFile {
    async fn read_line_raw(&self, line: usize, buf: &mut Vec<u8>) -> Result<usize> {
        let (start, end) = self.index.range(line)?;
        let expected = (end - start) as usize;

        let old_len = buf.len();
        buf.resize(old_len + expected, 0);

        // Seek and read have to happen without anyone else moving the cursor in between
        let read = {
            let mut file = self.inner_file.lock().await;
            file.seek(SeekFrom::Start(start)).await?;
            read_full(&mut *file, &mut buf[old_len..]).await?
        };

        if read < expected {
            buf.truncate(old_len);
            return Err(Error::ShortRead {
                offset: start,
                expected,
                read,
            });
        }

        Ok(expected)
    }
}

/// Like `read_exact` but reports how much could be read instead of failing on EOF
async fn read_full<R: Read + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]).await? {
            0 => break,
            n => read += n,
        }
    }
    Ok(read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_history(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[async_std::test]
    async fn test_open_missing() {
        let res = HistoryFile::open("./testfiles/does_not_exist").await;
        assert!(matches!(res, Err(Error::Io(_))));
    }

    #[async_std::test]
    async fn test_read_appends() {
        let tmp = temp_history("ANTS,1\nBEST,2.5,0,1\n");
        let file = HistoryFile::open(tmp.path().to_str().unwrap()).await.unwrap();

        let mut buf = b"prefix:".to_vec();
        let n = file.read_line_raw(1, &mut buf).await.unwrap();
        assert_eq!(n, 12);
        assert_eq!(buf, b"prefix:BEST,2.5,0,1");
    }

    #[async_std::test]
    async fn test_progress() {
        let tmp = temp_history("ANTS,1\nANTS,2\nANTS,3\n");
        let mut last = (0, 0);
        let file = HistoryFile::open_with_progress(tmp.path().to_str().unwrap(), |read, total| {
            last = (read, total);
        })
        .await
        .unwrap();

        assert_eq!(file.total_lines(), 3);
        assert_eq!(last, (21, 21));
    }

    #[async_std::test]
    async fn test_appended_content_invisible() {
        let mut tmp = temp_history("ANTS,1\n");
        let file = HistoryFile::open(tmp.path().to_str().unwrap()).await.unwrap();

        tmp.write_all(b"ANTS,2\n").unwrap();
        tmp.flush().unwrap();

        assert_eq!(file.total_lines(), 1);
        assert_eq!(file.read_line(0).await.unwrap(), "ANTS,1");
        assert!(file.read_line(1).await.is_err());
    }

    #[async_std::test]
    async fn test_short_read() {
        let tmp = temp_history("ANTS,1\nANTS,2,3,4\n");
        let file = HistoryFile::open(tmp.path().to_str().unwrap()).await.unwrap();

        // Truncate the file behind the index' back
        tmp.as_file().set_len(10).unwrap();

        let mut buf = Vec::new();
        let res = file.read_line_raw(1, &mut buf).await;
        assert!(matches!(
            res,
            Err(Error::ShortRead {
                offset: 7,
                expected: 10,
                read: 3
            })
        ));
        assert!(buf.is_empty());
        assert!(res.unwrap_err().is_fatal());
    }

    #[async_std::test]
    async fn test_concurrent_reads() {
        let content: String = (0..200).map(|i| format!("ANTS,{},{}\n", i, i + 1)).collect();
        let tmp = temp_history(&content);
        let file = std::sync::Arc::new(HistoryFile::open(tmp.path().to_str().unwrap()).await.unwrap());

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let file = file.clone();
                async_std::task::spawn(async move {
                    let line = file.read_line(i).await.unwrap();
                    assert_eq!(line, format!("ANTS,{},{}", i, i + 1));
                })
            })
            .collect();

        for task in tasks {
            task.await;
        }
    }
}
