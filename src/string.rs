use async_trait::async_trait;

use crate::{index::Index, Indexable, ReadByLine, Result};

/// A history held in memory which implements `ReadByLine` and holds an index of the lines.
#[derive(Debug, Clone)]
pub struct IndexedString {
    data: String,
    index: Index,
}

impl IndexedString {
    /// Create a new `IndexedString` from unindexed text and builds an index.
    pub fn new<S: Into<String>>(s: S) -> IndexedString {
        let data = s.into();
        let index = Index::from_bytes(data.as_bytes());
        Self { data, index }
    }
}

impl Indexable for IndexedString {
    #[inline]
    fn get_index(&self) -> &Index {
        &self.index
    }
}

#[async_trait]
impl ReadByLine for IndexedString {
    async fn read_line_raw(&self, line: usize, buf: &mut Vec<u8>) -> Result<usize> {
        let (start, end) = self.index.range(line)?;
        let bytes = &self.data.as_bytes()[start as usize..end as usize];
        buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}
