use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::registry::ReaderKind;

/// Accepts in-memory arrays whose buffer matches their declared shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayLikeReader;

#[async_trait]
impl FormatReader for ArrayLikeReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::ArrayLike
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        match input {
            InputDescriptor::ArrayLike(array) => Ok(array.is_consistent()),
            InputDescriptor::File(_) => Ok(false),
        }
    }
}
