use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::format::magic::{is_lif_header, SIGNATURE_PREFIX_LEN};
use crate::registry::ReaderKind;

/// Accepts Leica LIF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifReader;

#[async_trait]
impl FormatReader for LifReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::Lif
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        let Some(source) = input.source() else {
            return Ok(false);
        };
        let prefix = source.read_prefix(SIGNATURE_PREFIX_LEN).await?;
        Ok(is_lif_header(&prefix))
    }
}
