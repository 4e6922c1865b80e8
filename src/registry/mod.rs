//! Format registry: extension keys to ordered candidate readers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        data/formats.json (routes)       │
//! └────────────────────┬────────────────────┘
//!                      │ RegistryData::parse
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            RegistryBuilder              │
//! │  (priority bands + policy + dedup)      │
//! └────────────────────┬────────────────────┘
//!                      │ build
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     FormatRegistry (immutable map)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The built-in registry is parsed once per process and shared as a
//! `&'static` reference. Custom registries (another data file, a different
//! band policy, synthetic test data) are ordinary owned values.

mod advisor;
mod builder;
mod data;
mod kind;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::RegistryError;
use crate::format::{ExtensionKey, ExtensionNormalizer};

pub use advisor::{Availability, DependencyAdvisor};
pub use builder::{BandPolicy, CandidateList, PriorityBand, RegistryBuilder};
pub use data::BUILTIN_REGISTRY_JSON;
pub use kind::{InstallGroup, ReaderKind};

use data::RegistryData;

static BUILTIN: LazyLock<Result<FormatRegistry, RegistryError>> =
    LazyLock::new(|| FormatRegistry::from_json_str(BUILTIN_REGISTRY_JSON, BandPolicy::default()));

/// Immutable mapping from extension key to candidate readers.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    routes: BTreeMap<ExtensionKey, CandidateList>,
    fallback: Option<CandidateList>,
    bands: Vec<PriorityBand>,
}

impl FormatRegistry {
    pub(crate) fn from_parts(
        routes: BTreeMap<ExtensionKey, CandidateList>,
        fallback: Option<CandidateList>,
        bands: Vec<PriorityBand>,
    ) -> Self {
        Self {
            routes,
            fallback,
            bands,
        }
    }

    /// The registry shipped with the crate, under the default band policy.
    pub fn builtin() -> Result<&'static FormatRegistry, RegistryError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Parse registry data and build it under `policy`.
    pub fn from_json_str(json: &str, policy: BandPolicy) -> Result<Self, RegistryError> {
        RegistryData::parse(json)?.build(policy)
    }

    /// Load registry data from a file.
    pub fn from_path(path: impl AsRef<Path>, policy: BandPolicy) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| RegistryError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json, policy)
    }

    /// Candidate readers for a key, or `None` if the format is unknown.
    pub fn lookup(&self, key: &ExtensionKey) -> Option<&CandidateList> {
        self.routes.get(key)
    }

    /// Readers tried for inputs without an extension.
    pub fn fallback(&self) -> Option<&CandidateList> {
        self.fallback.as_ref()
    }

    /// Every registered key.
    pub fn all_extensions(&self) -> BTreeSet<ExtensionKey> {
        self.routes.keys().cloned().collect()
    }

    /// Registered keys in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &ExtensionKey> {
        self.routes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtensionKey, &CandidateList)> {
        self.routes.iter()
    }

    /// Band order the registry was built with.
    pub fn bands(&self) -> &[PriorityBand] {
        &self.bands
    }

    /// Every reader referenced by a route or the fallback.
    pub fn readers(&self) -> BTreeSet<ReaderKind> {
        self.routes
            .values()
            .chain(self.fallback.iter())
            .flat_map(|list| list.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// A normalizer that knows every compound key in this registry.
    pub fn normalizer(&self) -> ExtensionNormalizer {
        ExtensionNormalizer::new(
            self.routes
                .keys()
                .filter(|key| key.is_compound())
                .map(|key| key.as_str().to_string()),
        )
    }
}
