//! Capability checks for the known readers.
//!
//! Every reader exposes a cheap `can_read` that inspects a bounded header
//! region and decides whether it can likely open the input. Full parsing is
//! left to the reader implementation that the caller opens afterwards.
//!
//! Readers backed by an optional install group are only compiled in when the
//! matching cargo feature is enabled:
//!
//! | Reader             | Feature        | Check                                  |
//! |--------------------|----------------|----------------------------------------|
//! | `ArrayLikeReader`  | -              | buffer length matches shape            |
//! | `OmeTiffReader`    | -              | TIFF + `<OME` in first ImageDescription |
//! | `TiffReader`       | -              | TIFF / BigTIFF signature               |
//! | `CziReader`        | `czi`          | `ZISRAWFILE` segment id                |
//! | `LifReader`        | `lif`          | LIF test value and memory marker       |
//! | `BioformatsReader` | `bioformats`   | non-empty file                         |
//! | `DefaultReader`    | `base-imageio` | `image::guess_format` recognises it    |

mod array_like;
#[cfg(feature = "bioformats")]
mod bioformats;
#[cfg(feature = "czi")]
mod czi;
#[cfg(feature = "base-imageio")]
mod imageio;
mod input;
#[cfg(feature = "lif")]
mod lif;
mod tiff;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CheckError;
use crate::registry::ReaderKind;

pub use array_like::ArrayLikeReader;
#[cfg(feature = "bioformats")]
pub use bioformats::BioformatsReader;
#[cfg(feature = "czi")]
pub use czi::CziReader;
#[cfg(feature = "base-imageio")]
pub use imageio::DefaultReader;
pub use input::{ArrayLike, InputDescriptor};
#[cfg(feature = "lif")]
pub use lif::LifReader;
pub use tiff::{OmeTiffReader, TiffReader};

/// Uniform capability-check interface used by the resolver.
///
/// Implementations must be side-effect free: the resolver may call
/// `can_read` on several readers for the same input, and a caller may resolve
/// the same input repeatedly.
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Which reader this is.
    fn kind(&self) -> ReaderKind;

    /// Decide whether this reader can likely open `input`.
    ///
    /// Errors mean the check itself failed (I/O, truncated header); the
    /// resolver treats them as a rejection and moves on.
    async fn can_read(&self, input: &InputDescriptor) -> Result<bool, CheckError>;
}

/// Capability-check backends keyed by reader kind.
#[derive(Clone, Default)]
pub struct ReaderSet {
    readers: BTreeMap<ReaderKind, Arc<dyn FormatReader>>,
}

impl ReaderSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every reader compiled into this build.
    pub fn builtin() -> Self {
        let set = Self::empty()
            .with(ArrayLikeReader)
            .with(OmeTiffReader::default())
            .with(TiffReader);

        #[cfg(feature = "czi")]
        let set = set.with(CziReader);
        #[cfg(feature = "lif")]
        let set = set.with(LifReader);
        #[cfg(feature = "bioformats")]
        let set = set.with(BioformatsReader);
        #[cfg(feature = "base-imageio")]
        let set = set.with(DefaultReader);

        set
    }

    /// Add or replace the backend for `reader.kind()`.
    pub fn with<R: FormatReader + 'static>(mut self, reader: R) -> Self {
        self.insert(Arc::new(reader));
        self
    }

    pub fn insert(&mut self, reader: Arc<dyn FormatReader>) {
        self.readers.insert(reader.kind(), reader);
    }

    pub fn get(&self, kind: ReaderKind) -> Option<&Arc<dyn FormatReader>> {
        self.readers.get(&kind)
    }

    pub fn contains(&self, kind: ReaderKind) -> bool {
        self.readers.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ReaderKind> + '_ {
        self.readers.keys().copied()
    }
}

impl std::fmt::Debug for ReaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.readers.keys()).finish()
    }
}
