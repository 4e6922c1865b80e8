use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::format::magic::{is_czi_header, SIGNATURE_PREFIX_LEN};
use crate::registry::ReaderKind;

/// Accepts Zeiss CZI files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CziReader;

#[async_trait]
impl FormatReader for CziReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::Czi
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        let Some(source) = input.source() else {
            return Ok(false);
        };
        let prefix = source.read_prefix(SIGNATURE_PREFIX_LEN).await?;
        Ok(is_czi_header(&prefix))
    }
}
