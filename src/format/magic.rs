//! Fixed-offset signatures for non-TIFF container formats.

/// Segment id opening every Zeiss CZI file (`ZISRAWFILE`, zero padded to 16 bytes).
pub const CZI_FILE_SEGMENT_ID: &[u8] = b"ZISRAWFILE";

/// Leica LIF files start with a little-endian `0x70` test value.
const LIF_TEST_VALUE: u32 = 0x70;

/// Byte at offset 8 marking the start of the LIF XML memory block.
const LIF_MEMORY_BLOCK_MARKER: u8 = 0x2A;

/// Bytes needed to run every check in this module.
pub const SIGNATURE_PREFIX_LEN: usize = 16;

/// Check for the CZI file header segment.
pub fn is_czi_header(bytes: &[u8]) -> bool {
    bytes.starts_with(CZI_FILE_SEGMENT_ID)
}

/// Check for the LIF test value and memory block marker.
pub fn is_lif_header(bytes: &[u8]) -> bool {
    if bytes.len() < 9 {
        return false;
    }
    let test_value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    test_value == LIF_TEST_VALUE && bytes[8] == LIF_MEMORY_BLOCK_MARKER
}
