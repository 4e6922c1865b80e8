use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a file-like resource.
///
/// Capability checks only ever look at small header regions, so this
/// abstraction lets them work against local files and in-memory buffers
/// alike without loading the whole payload. Implementations must be
/// thread-safe.
#[async_trait]
pub trait RangeReader: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get the name of this resource (a path or file name).
    ///
    /// The extension normalizer routes on this value.
    fn identifier(&self) -> &str;

    /// Read up to `len` bytes from the start of the resource.
    ///
    /// Unlike [`read_exact_at`](Self::read_exact_at) this never fails on a
    /// short resource; it returns whatever prefix exists.
    async fn read_prefix(&self, len: usize) -> Result<Bytes, IoError> {
        let len = (len as u64).min(self.size()) as usize;
        self.read_exact_at(0, len).await
    }
}

/// Validate that `offset + len` fits in a resource of `size` bytes.
pub(crate) fn check_range(offset: u64, len: usize, size: u64) -> Result<(), IoError> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => Err(IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size,
        }),
    }
}
