//! Format identification primitives.
//!
//! - [`extension`]: extension keys and the file-name normalizer
//! - [`tiff`]: TIFF header and first-IFD description reading
//! - [`magic`]: fixed-offset signatures for CZI and LIF

pub mod extension;
pub mod magic;
pub mod tiff;

pub use extension::{ExtensionKey, ExtensionNormalizer, ARRAY_LIKE_KEY, DEFAULT_COMPOUND_SUFFIXES};
pub use magic::{is_czi_header, is_lif_header};
pub use tiff::{is_tiff_header, ByteOrder, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
