use thiserror::Error;

use crate::registry::{InstallGroup, ReaderKind};
use crate::resolve::Attempt;

/// I/O errors that can occur when reading from a byte source
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),

    /// Any other read failure (permissions, interrupted, ...)
    #[error("Read error: {0}")]
    Read(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Read(err.to_string())
    }
}

/// Errors that can occur when parsing TIFF headers
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// IFD declares more entries than a header check is willing to read
    #[error("IFD entry count {0} exceeds limit")]
    TooManyEntries(u64),
}

/// Failure of a single capability check.
///
/// These never abort a resolution; the resolver skips the candidate and
/// records the cause.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    #[error("Malformed header: {0}")]
    Malformed(String),
}

/// Errors raised while loading or building a format registry
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry data file is not valid JSON or has an unknown reader/band
    #[error("Failed to parse registry data: {0}")]
    Parse(String),

    /// The registry data file could not be read
    #[error("Failed to read registry data from {path}: {message}")]
    Read { path: String, message: String },

    /// A route lists no readers
    #[error("Route for band '{band}' has no readers")]
    EmptyRoute { band: String },

    /// An extension key is not lowercase, dot-trimmed text
    #[error("Invalid extension key '{0}'")]
    InvalidExtension(String),

    /// A route uses a band missing from the band order
    #[error("Band '{0}' is not part of the band order")]
    UnorderedBand(String),

    /// A band appears twice in the band order
    #[error("Band '{0}' appears more than once in the band order")]
    DuplicateBand(String),

    /// A candidate list was built with a repeated reader
    #[error("Reader {0} appears more than once in a candidate list")]
    DuplicateReader(ReaderKind),

    /// A candidate list was built empty
    #[error("Candidate list is empty")]
    EmptyCandidates,

    /// Two different install groups were registered for one reader
    #[error("Reader {reader} already has install group '{existing}', refusing '{requested}'")]
    ConflictingHint {
        reader: ReaderKind,
        existing: InstallGroup,
        requested: InstallGroup,
    },
}

/// Errors returned by [`crate::resolve::Resolver::resolve`]
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The extension has no entry in the registry
    #[error("Unsupported format: no readers registered for extension '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Every candidate was skipped because its optional dependency is absent
    #[error(
        "Reader {reader} is required for '{extension}' but is not installed \
         (enable install group '{install_group}'); tried: {}",
        format_attempts(attempted)
    )]
    MissingOptionalDependency {
        extension: String,
        reader: ReaderKind,
        install_group: InstallGroup,
        attempted: Vec<Attempt>,
    },

    /// Every candidate was skipped or rejected the input
    #[error("No reader accepted '{extension}'; tried: {}", format_attempts(attempted))]
    NoReaderAccepted {
        extension: String,
        attempted: Vec<Attempt>,
    },

    /// The runtime cancelled the task resolving this input
    #[error("Resolution cancelled before a reader was chosen")]
    Cancelled,
}

impl ResolveError {
    /// Per-candidate attempts, empty for unsupported formats.
    pub fn attempted(&self) -> &[Attempt] {
        match self {
            ResolveError::UnsupportedFormat { .. } | ResolveError::Cancelled => &[],
            ResolveError::MissingOptionalDependency { attempted, .. }
            | ResolveError::NoReaderAccepted { attempted, .. } => attempted,
        }
    }

    /// Install groups that would have made additional candidates usable.
    pub fn install_groups(&self) -> Vec<InstallGroup> {
        let mut groups: Vec<InstallGroup> = Vec::new();
        for group in self.attempted().iter().filter_map(Attempt::install_group) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }
}

fn format_attempts(attempted: &[Attempt]) -> String {
    if attempted.is_empty() {
        return "no candidates".to_string();
    }
    attempted
        .iter()
        .map(|a| format!("{} ({})", a.reader, a.reason))
        .collect::<Vec<_>>()
        .join(", ")
}
