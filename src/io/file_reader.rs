use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::range_reader::{check_range, RangeReader};
use crate::error::IoError;

/// Local-file implementation of RangeReader.
///
/// The file size is fetched once on creation. Each read opens its own handle,
/// so concurrent checks against the same file never share a cursor.
#[derive(Debug, Clone)]
pub struct FileRangeReader {
    path: PathBuf,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open a reader for the file at `path`.
    ///
    /// Returns `IoError::NotFound` if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        let identifier = path.to_string_lossy().into_owned();

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IoError::NotFound(identifier.clone())
            } else {
                IoError::Read(format!("{}: {}", identifier, e))
            }
        })?;

        if !metadata.is_file() {
            return Err(IoError::Read(format!("{} is not a regular file", identifier)));
        }

        Ok(Self {
            path,
            size: metadata.len(),
            identifier,
        })
    }

    /// Get the path this reader was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RangeReader for FileRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size)?;

        if len == 0 {
            return Ok(Bytes::new());
        }

        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf).await?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
