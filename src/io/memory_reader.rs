use async_trait::async_trait;
use bytes::Bytes;

use super::range_reader::{check_range, RangeReader};
use crate::error::IoError;

/// In-memory implementation of RangeReader.
///
/// Used for buffers that already live in memory (uploads, fetched blobs,
/// tests). Reads are zero-copy slices of the backing `Bytes`.
#[derive(Debug, Clone)]
pub struct MemoryRangeReader {
    data: Bytes,
    identifier: String,
}

impl MemoryRangeReader {
    pub fn new(identifier: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }
}

#[async_trait]
impl RangeReader for MemoryRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.data.len() as u64)?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
