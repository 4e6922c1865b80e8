use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::registry::ReaderKind;

/// Bio-Formats bridge check.
///
/// Bio-Formats picks its own sub-reader by suffix once the file is handed to
/// it, and routing has already matched the suffix, so the only thing worth
/// checking up front is that there is something to read.
#[derive(Debug, Clone, Copy, Default)]
pub struct BioformatsReader;

#[async_trait]
impl FormatReader for BioformatsReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::Bioformats
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        Ok(input.source().is_some_and(|source| source.size() > 0))
    }
}
