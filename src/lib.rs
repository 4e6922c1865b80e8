//! # Bioimage Resolver
//!
//! Picks the reader for a microscopy or medical image file.
//!
//! A file name is normalized to an extension key, the key selects an ordered
//! list of candidate readers from a priority-banded registry, and each
//! candidate runs a cheap capability check on the file header until one
//! accepts. Readers whose optional install group is missing are skipped
//! without being asked, and the caller gets either the chosen reader with the
//! reasons every earlier candidate was passed over, or an error listing all of
//! them.
//!
//! ## Features
//!
//! - **Priority bands**: specialized readers always come before generic ones
//! - **Compound extensions**: `ome.tif` and `nii.gz` win over `tif` and `gz`
//! - **Optional readers**: install groups are cargo features, checked at build time
//! - **Bounded checks**: every capability check reads a few bytes through [`io::RangeReader`]
//!
//! ## Architecture
//!
//! - [`mod@format`] - Extension normalization and header signatures
//! - [`registry`] - Format registry, band policy and dependency advisor
//! - [`readers`] - Capability checks and input descriptors
//! - [`resolve`] - The resolver that walks the candidate list
//! - [`io`] - Range-based byte sources (local files, memory)
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use bioimage_resolver::{InputDescriptor, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::builtin()?;
//!     let input = InputDescriptor::open("scan.ome.tif").await?;
//!
//!     let resolution = resolver.resolve(&input).await?;
//!     println!("open with {}", resolution.reader);
//!     for attempt in &resolution.skipped {
//!         println!("skipped {}", attempt);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod readers;
pub mod registry;
pub mod resolve;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ExplainConfig, FormatsConfig, RegistryArgs, ResolveConfig};
pub use error::{CheckError, IoError, RegistryError, ResolveError, TiffError};
pub use format::{ExtensionKey, ExtensionNormalizer};
pub use io::{FileRangeReader, MemoryRangeReader, RangeReader};
pub use readers::{ArrayLike, FormatReader, InputDescriptor, ReaderSet};
pub use registry::{
    Availability, BandPolicy, CandidateList, DependencyAdvisor, FormatRegistry, InstallGroup,
    PriorityBand, ReaderKind, RegistryBuilder,
};
pub use resolve::{
    Attempt, Plan, PlannedCandidate, Resolution, Resolver, Route, SkipReason,
    DEFAULT_CHECK_TIMEOUT,
};
