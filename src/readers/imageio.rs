use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::registry::ReaderKind;

/// Bytes handed to `image::guess_format`; its longest signature is 12 bytes.
const SNIFF_LEN: usize = 32;

/// Generic image codec check, backed by the `image` crate's signature table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReader;

#[async_trait]
impl FormatReader for DefaultReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::Default
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        let Some(source) = input.source() else {
            return Ok(false);
        };
        let prefix = source.read_prefix(SNIFF_LEN).await?;
        match image::guess_format(&prefix) {
            Ok(format) => {
                tracing::trace!(format = ?format, "Image signature recognised");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}
