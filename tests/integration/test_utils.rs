//! Test utilities for integration tests.
//!
//! Mock readers with call tracking, a byte source that counts reads, and
//! builders for the smallest headers each capability check accepts.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bioimage_resolver::error::{CheckError, IoError};
use bioimage_resolver::io::RangeReader;
use bioimage_resolver::{FormatReader, InputDescriptor, ReaderKind};

// =============================================================================
// Mock Reader with Call Tracking
// =============================================================================

/// What a [`MockReader`] answers from `can_read`.
#[derive(Debug, Clone, Copy)]
pub enum MockAnswer {
    Accept,
    Reject,
    Fail,
    Sleep(Duration),
}

/// A capability check with a fixed answer that counts how often it ran.
#[derive(Clone)]
pub struct MockReader {
    kind: ReaderKind,
    answer: MockAnswer,
    calls: Arc<AtomicUsize>,
}

impl MockReader {
    pub fn new(kind: ReaderKind, answer: MockAnswer) -> Self {
        Self {
            kind,
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn accepting(kind: ReaderKind) -> Self {
        Self::new(kind, MockAnswer::Accept)
    }

    pub fn rejecting(kind: ReaderKind) -> Self {
        Self::new(kind, MockAnswer::Reject)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormatReader for MockReader {
    fn kind(&self) -> ReaderKind {
        self.kind
    }

    async fn can_read(&self, _input: &InputDescriptor) -> Result<bool, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            MockAnswer::Accept => Ok(true),
            MockAnswer::Reject => Ok(false),
            MockAnswer::Fail => Err(CheckError::Malformed("mock failure".to_string())),
            MockAnswer::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                Ok(true)
            }
        }
    }
}

// =============================================================================
// Byte Source with Read Tracking
// =============================================================================

/// An in-memory range reader that counts read requests.
#[derive(Clone)]
pub struct TrackingReader {
    data: Bytes,
    identifier: String,
    reads: Arc<AtomicUsize>,
}

impl TrackingReader {
    pub fn new(identifier: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RangeReader for TrackingReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Header Builders
// =============================================================================

/// Little-endian TIFF with a single IFD holding only an ImageDescription.
pub fn create_tiff_with_description(description: &[u8]) -> Vec<u8> {
    let mut data = b"II*\0".to_vec();
    data.extend_from_slice(&8u32.to_le_bytes());
    // IFD: 1 entry, tag 270 (ImageDescription), type ASCII
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&270u16.to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    data.extend_from_slice(&(description.len() as u32).to_le_bytes());
    data.extend_from_slice(&26u32.to_le_bytes());
    // Next IFD offset
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(description);
    data
}

pub fn create_plain_tiff() -> Vec<u8> {
    create_tiff_with_description(b"Generic pyramidal image")
}

pub fn create_ome_tiff() -> Vec<u8> {
    create_tiff_with_description(
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
          <OME xmlns=\"http://www.openmicroscopy.org/Schemas/OME/2016-06\">\
          <Image ID=\"Image:0\"/></OME>",
    )
}

/// Big-endian BigTIFF header with an empty first IFD.
pub fn create_bigtiff() -> Vec<u8> {
    let mut data = b"MM".to_vec();
    data.extend_from_slice(&43u16.to_be_bytes());
    data.extend_from_slice(&8u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&16u64.to_be_bytes());
    data.extend_from_slice(&0u64.to_be_bytes());
    data.extend_from_slice(&0u64.to_be_bytes());
    data
}

pub fn create_czi() -> Vec<u8> {
    let mut data = b"ZISRAWFILE".to_vec();
    data.resize(64, 0);
    data
}

pub fn create_lif() -> Vec<u8> {
    let mut data = 0x70u32.to_le_bytes().to_vec();
    data.extend_from_slice(&0x40u32.to_le_bytes());
    data.push(0x2A);
    data.resize(64, 0);
    data
}

/// A real baseline JPEG.
#[cfg(feature = "base-imageio")]
pub fn create_jpeg() -> Vec<u8> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{Rgb, RgbImage};

    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 32) as u8, (y * 32) as u8, 128]));
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Bytes no built-in check recognises.
pub fn create_garbage(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8 | 0x01).collect()
}

// =============================================================================
// Temporary Files
// =============================================================================

/// A file in the system temp directory, removed on drop.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(name: &str, data: &[u8]) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "bioimage-resolver-it-{}-{}",
            std::process::id(),
            unique_suffix()
        ));
        std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, data).expect("Failed to write temp file");
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

fn unique_suffix() -> usize {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}
