use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::IoError;
use crate::io::{FileRangeReader, MemoryRangeReader, RangeReader};

/// The input being resolved.
///
/// Constructed per resolution and never persisted. Cloning is cheap: file
/// inputs share their byte source, arrays share their buffer.
#[derive(Clone)]
pub enum InputDescriptor {
    /// A named byte source; its identifier drives extension routing
    File(Arc<dyn RangeReader>),
    /// An in-memory array; always routed to the reserved `array-like` key
    ArrayLike(ArrayLike),
}

impl InputDescriptor {
    /// Open a local file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let reader = FileRangeReader::open(path).await?;
        Ok(Self::File(Arc::new(reader)))
    }

    /// Wrap an in-memory buffer that carries a file name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::File(Arc::new(MemoryRangeReader::new(name, data)))
    }

    /// Wrap any byte source.
    pub fn from_reader<R: RangeReader + 'static>(reader: R) -> Self {
        Self::File(Arc::new(reader))
    }

    /// Wrap an in-memory array.
    pub fn array_like(array: ArrayLike) -> Self {
        Self::ArrayLike(array)
    }

    /// Name used in logs and errors.
    pub fn name(&self) -> &str {
        match self {
            InputDescriptor::File(reader) => reader.identifier(),
            InputDescriptor::ArrayLike(_) => "<array-like>",
        }
    }

    /// The byte source, if this is a file input.
    pub fn source(&self) -> Option<&dyn RangeReader> {
        match self {
            InputDescriptor::File(reader) => Some(reader.as_ref()),
            InputDescriptor::ArrayLike(_) => None,
        }
    }
}

impl std::fmt::Debug for InputDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputDescriptor::File(reader) => f
                .debug_struct("File")
                .field("identifier", &reader.identifier())
                .field("size", &reader.size())
                .finish(),
            InputDescriptor::ArrayLike(array) => f.debug_tuple("ArrayLike").field(array).finish(),
        }
    }
}

/// A dense, row-major in-memory array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLike {
    shape: Vec<usize>,
    element_size: usize,
    data: Bytes,
}

impl ArrayLike {
    pub fn new(shape: Vec<usize>, element_size: usize, data: impl Into<Bytes>) -> Self {
        Self {
            shape,
            element_size,
            data: data.into(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Expected buffer length, `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(self.element_size, |acc, dim| acc.checked_mul(*dim))
    }

    /// Whether the buffer length matches the shape and element size.
    pub fn is_consistent(&self) -> bool {
        !self.shape.is_empty()
            && self.element_size > 0
            && self.expected_len() == Some(self.data.len())
    }
}
