//! Minimal TIFF structure reading for capability checks.
//!
//! Only what a header sniff needs: the file header and the
//! `ImageDescription` tag of the first IFD. Pixel data and the rest of the
//! IFD chain are the business of the reader that ends up opening the file.
//!
//! # TIFF Header Structure
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order ("II" little-endian, "MM" big-endian)
//! Bytes 2-3: Version (42)
//! Bytes 4-7: Offset to first IFD
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order
//! Bytes 2-3: Version (43)
//! Bytes 4-5: Offset byte size (must be 8)
//! Bytes 6-7: Reserved
//! Bytes 8-15: Offset to first IFD
//! ```

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::RangeReader;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of BigTIFF header in bytes
pub const BIGTIFF_HEADER_SIZE: usize = 16;

const BYTE_ORDER_LITTLE_ENDIAN: [u8; 2] = *b"II";
const BYTE_ORDER_BIG_ENDIAN: [u8; 2] = *b"MM";
const VERSION_TIFF: u16 = 42;
const VERSION_BIGTIFF: u16 = 43;

/// Tag number of ImageDescription.
const TAG_IMAGE_DESCRIPTION: u16 = 270;

/// Header checks refuse IFDs larger than this; real first IFDs hold a few
/// dozen entries.
const MAX_IFD_ENTRIES: u64 = 4096;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) declared by a TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }

    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub is_bigtiff: bool,
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// `file_size` is used to reject a first IFD offset outside the file.
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let byte_order = match [bytes[0], bytes[1]] {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(u16::from_le_bytes([bytes[0], bytes[1]]))),
        };

        let (is_bigtiff, first_ifd_offset) = match byte_order.read_u16(&bytes[2..4]) {
            VERSION_TIFF => (false, byte_order.read_u32(&bytes[4..8]) as u64),
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }
                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }
                (true, byte_order.read_u64(&bytes[8..16]))
            }
            version => return Err(TiffError::InvalidVersion(version)),
        };

        if first_ifd_offset >= file_size {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            is_bigtiff,
            first_ifd_offset,
        })
    }

    /// Size of the IFD entry-count field.
    fn count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of one IFD entry.
    fn entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Bytes available for an inline value inside an entry.
    fn inline_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }
}

/// Quick check that `bytes` starts with a TIFF or BigTIFF signature.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    let byte_order = match [bytes[0], bytes[1]] {
        BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
        BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
        _ => return false,
    };
    matches!(byte_order.read_u16(&bytes[2..4]), VERSION_TIFF | VERSION_BIGTIFF)
}

/// Read the header of a TIFF resource.
pub async fn read_header<R: RangeReader + ?Sized>(reader: &R) -> Result<TiffHeader, TiffError> {
    let bytes = reader.read_prefix(BIGTIFF_HEADER_SIZE).await?;
    TiffHeader::parse(&bytes, reader.size())
}

/// Read up to `max_len` bytes of the first IFD's ImageDescription.
///
/// Returns `None` when the tag is absent or empty.
pub async fn read_first_description<R: RangeReader + ?Sized>(
    reader: &R,
    header: &TiffHeader,
    max_len: usize,
) -> Result<Option<Bytes>, TiffError> {
    let order = header.byte_order;
    let ifd_offset = header.first_ifd_offset;

    let count_bytes = reader.read_exact_at(ifd_offset, header.count_size()).await?;
    let entry_count = if header.is_bigtiff {
        order.read_u64(&count_bytes)
    } else {
        order.read_u16(&count_bytes) as u64
    };
    if entry_count > MAX_IFD_ENTRIES {
        return Err(TiffError::TooManyEntries(entry_count));
    }

    let entry_size = header.entry_size();
    let entries = reader
        .read_exact_at(
            ifd_offset + header.count_size() as u64,
            entry_count as usize * entry_size,
        )
        .await?;

    for entry in entries.chunks_exact(entry_size) {
        if order.read_u16(&entry[0..2]) != TAG_IMAGE_DESCRIPTION {
            continue;
        }

        // ASCII, BYTE and UNDEFINED are all one byte per element
        let count = if header.is_bigtiff {
            order.read_u64(&entry[4..12])
        } else {
            order.read_u32(&entry[4..8]) as u64
        };
        let read_len = (count as usize).min(max_len);
        if read_len == 0 {
            return Ok(None);
        }

        let value_field = if header.is_bigtiff {
            &entry[12..20]
        } else {
            &entry[8..12]
        };

        if count as usize <= header.inline_size() {
            return Ok(Some(Bytes::copy_from_slice(&value_field[..read_len])));
        }

        let value_offset = if header.is_bigtiff {
            order.read_u64(value_field)
        } else {
            order.read_u32(value_field) as u64
        };
        let read_len = read_len.min(reader.size().saturating_sub(value_offset) as usize);
        if read_len == 0 {
            return Ok(None);
        }
        return Ok(Some(reader.read_exact_at(value_offset, read_len).await?));
    }

    Ok(None)
}
