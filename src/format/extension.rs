//! Extension keys and the normalizer that derives them from file names.
//!
//! A key is the lowercase suffix that selects a registry route. Most keys are
//! single suffixes (`czi`, `tif`), but some formats are only distinguishable
//! by a compound suffix (`ome.tif`, `nii.gz`). Those must win over their final
//! component, otherwise an OME-TIFF would be routed as a plain TIFF.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Registry key reserved for in-memory array inputs.
pub const ARRAY_LIKE_KEY: &str = "array-like";

/// Compound suffixes recognised by [`ExtensionNormalizer::default`].
pub const DEFAULT_COMPOUND_SUFFIXES: &[&str] = &["ome.tiff", "ome.tif", "nii.gz", "ct.img"];

// =============================================================================
// ExtensionKey
// =============================================================================

/// Canonical, lowercase extension identifying a format family.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionKey(String);

impl ExtensionKey {
    /// Validate and wrap a key.
    ///
    /// Keys are non-empty, lowercase, free of whitespace and path separators,
    /// and have no empty dot-separated segment.
    pub fn new(key: impl Into<String>) -> Result<Self, RegistryError> {
        let key = key.into();
        let valid = !key.is_empty()
            && key.split('.').all(|segment| !segment.is_empty())
            && !key
                .chars()
                .any(|c| c.is_uppercase() || c.is_whitespace() || c == '/' || c == '\\');

        if valid {
            Ok(Self(key))
        } else {
            Err(RegistryError::InvalidExtension(key))
        }
    }

    /// The reserved key for in-memory arrays.
    pub fn array_like() -> Self {
        Self(ARRAY_LIKE_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key spans more than one suffix (`ome.tif`).
    pub fn is_compound(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExtensionKey {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExtensionKey> for String {
    fn from(key: ExtensionKey) -> Self {
        key.0
    }
}

// =============================================================================
// ExtensionNormalizer
// =============================================================================

/// Derives an [`ExtensionKey`] from a path-like identifier.
#[derive(Debug, Clone)]
pub struct ExtensionNormalizer {
    /// Compound suffixes, longest first
    compound: Vec<String>,
}

impl ExtensionNormalizer {
    /// Create a normalizer that recognises the given compound suffixes.
    pub fn new<I, S>(compound_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut compound: Vec<String> = compound_suffixes
            .into_iter()
            .map(|s| s.into().to_lowercase())
            .filter(|s| s.contains('.'))
            .collect();
        // Longest first; ties broken alphabetically so the order is stable
        compound.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        compound.dedup();
        Self { compound }
    }

    /// Compound suffixes checked before single-suffix extraction.
    pub fn compound_suffixes(&self) -> &[String] {
        &self.compound
    }

    /// Normalize an identifier into an extension key.
    ///
    /// Only the final path component is considered. Returns `None` when the
    /// file name carries no extension (`README`, `.bashrc`, `scan.`) or when
    /// the extension text is not a valid key (`photo.png `).
    pub fn normalize(&self, identifier: &str) -> Option<ExtensionKey> {
        self.raw_extension(identifier)
            .and_then(|extension| ExtensionKey::new(extension).ok())
    }

    /// The lowercase extension text of an identifier, before key validation.
    ///
    /// Compound suffixes are matched first. Returns `None` only when the file
    /// name has no extension at all.
    pub fn raw_extension(&self, identifier: &str) -> Option<String> {
        let file_name = identifier
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(identifier)
            .to_lowercase();

        for suffix in &self.compound {
            if let Some(stem) = file_name.strip_suffix(suffix.as_str()) {
                if let Some(stem) = stem.strip_suffix('.') {
                    if !stem.is_empty() {
                        return Some(suffix.clone());
                    }
                }
            }
        }

        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(extension.to_string())
    }
}

impl Default for ExtensionNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOUND_SUFFIXES.iter().copied())
    }
}
