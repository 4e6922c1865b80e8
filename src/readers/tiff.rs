//! TIFF-family capability checks.
//!
//! OME-TIFF is an ordinary TIFF whose first ImageDescription holds an OME-XML
//! document, so the OME check has to look one level deeper than the plain
//! TIFF check: header, first IFD, then the description text.

use async_trait::async_trait;

use super::{FormatReader, InputDescriptor};
use crate::error::CheckError;
use crate::format::tiff::{is_tiff_header, read_first_description, read_header, BIGTIFF_HEADER_SIZE};
use crate::registry::ReaderKind;

/// Default number of ImageDescription bytes scanned for the OME root element.
pub const DEFAULT_MAX_DESCRIPTION_BYTES: usize = 4096;

/// Root element marker of an OME-XML document.
const OME_MARKER: &[u8] = b"<OME";

/// Accepts any TIFF or BigTIFF.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffReader;

#[async_trait]
impl FormatReader for TiffReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::Tiff
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        let Some(source) = input.source() else {
            return Ok(false);
        };
        let prefix = source.read_prefix(BIGTIFF_HEADER_SIZE).await?;
        Ok(is_tiff_header(&prefix))
    }
}

/// Accepts TIFFs carrying OME-XML metadata.
#[derive(Debug, Clone, Copy)]
pub struct OmeTiffReader {
    max_description_bytes: usize,
}

impl OmeTiffReader {
    pub fn with_max_description_bytes(max_description_bytes: usize) -> Self {
        Self {
            max_description_bytes,
        }
    }
}

impl Default for OmeTiffReader {
    fn default() -> Self {
        Self::with_max_description_bytes(DEFAULT_MAX_DESCRIPTION_BYTES)
    }
}

#[async_trait]
impl FormatReader for OmeTiffReader {
    fn kind(&self) -> ReaderKind {
        ReaderKind::OmeTiff
    }

    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError> {
        let Some(source) = input.source() else {
            return Ok(false);
        };

        // Not a TIFF at all is a plain rejection, not a failed check
        let prefix = source.read_prefix(BIGTIFF_HEADER_SIZE).await?;
        if !is_tiff_header(&prefix) {
            return Ok(false);
        }

        let header = read_header(source).await?;
        let description =
            read_first_description(source, &header, self.max_description_bytes).await?;

        Ok(description.is_some_and(|text| contains_ome_marker(&text)))
    }
}

fn contains_ome_marker(data: &[u8]) -> bool {
    data.windows(OME_MARKER.len()).any(|window| window == OME_MARKER)
}
