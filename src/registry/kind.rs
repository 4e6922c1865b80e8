//! The closed set of readers the resolver knows how to route to.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A known reader implementation.
///
/// Adding a reader means adding a variant here, a capability check in
/// [`crate::readers`], and routes in the registry data file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ReaderKind {
    /// In-memory arrays
    ArrayLike,
    /// OME-TIFF (TIFF with OME-XML in the first ImageDescription)
    OmeTiff,
    /// Plain TIFF / BigTIFF
    Tiff,
    /// Zeiss CZI
    Czi,
    /// Leica LIF
    Lif,
    /// Bio-Formats bridge, covers most proprietary microscope formats
    Bioformats,
    /// Generic image codec library
    Default,
}

impl ReaderKind {
    pub const ALL: [ReaderKind; 7] = [
        ReaderKind::ArrayLike,
        ReaderKind::OmeTiff,
        ReaderKind::Tiff,
        ReaderKind::Czi,
        ReaderKind::Lif,
        ReaderKind::Bioformats,
        ReaderKind::Default,
    ];

    /// Identifier used in the registry data file and on the command line.
    pub const fn id(&self) -> &'static str {
        match self {
            ReaderKind::ArrayLike => "array-like",
            ReaderKind::OmeTiff => "ome-tiff",
            ReaderKind::Tiff => "tiff",
            ReaderKind::Czi => "czi",
            ReaderKind::Lif => "lif",
            ReaderKind::Bioformats => "bioformats",
            ReaderKind::Default => "default",
        }
    }

    /// Human-readable reader name.
    pub const fn name(&self) -> &'static str {
        match self {
            ReaderKind::ArrayLike => "ArrayLikeReader",
            ReaderKind::OmeTiff => "OmeTiffReader",
            ReaderKind::Tiff => "TiffReader",
            ReaderKind::Czi => "CziReader",
            ReaderKind::Lif => "LifReader",
            ReaderKind::Bioformats => "BioformatsReader",
            ReaderKind::Default => "DefaultReader",
        }
    }

    /// Optional install group backing this reader, `None` for core readers.
    pub const fn install_group(&self) -> Option<InstallGroup> {
        match self {
            ReaderKind::ArrayLike | ReaderKind::OmeTiff | ReaderKind::Tiff => None,
            ReaderKind::Czi => Some(InstallGroup::Czi),
            ReaderKind::Lif => Some(InstallGroup::Lif),
            ReaderKind::Bioformats => Some(InstallGroup::Bioformats),
            ReaderKind::Default => Some(InstallGroup::BaseImageio),
        }
    }
}

impl fmt::Display for ReaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An optional dependency group. Each one is a cargo feature of this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum InstallGroup {
    Bioformats,
    BaseImageio,
    Lif,
    Czi,
}

impl InstallGroup {
    pub const fn name(&self) -> &'static str {
        match self {
            InstallGroup::Bioformats => "bioformats",
            InstallGroup::BaseImageio => "base-imageio",
            InstallGroup::Lif => "lif",
            InstallGroup::Czi => "czi",
        }
    }

    /// Whether the group's feature was enabled at build time.
    pub const fn is_compiled(&self) -> bool {
        match self {
            InstallGroup::Bioformats => cfg!(feature = "bioformats"),
            InstallGroup::BaseImageio => cfg!(feature = "base-imageio"),
            InstallGroup::Lif => cfg!(feature = "lif"),
            InstallGroup::Czi => cfg!(feature = "czi"),
        }
    }
}

impl fmt::Display for InstallGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
