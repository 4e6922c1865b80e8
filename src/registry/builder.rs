//! Priority-band registry construction.
//!
//! Routes are grouped into named bands. Within a band, readers keep the order
//! in which routes were added; across bands, the band order decides. This keeps
//! "custom reader before generic reader" an explicit rule instead of an
//! accident of literal ordering, and makes merging overlapping route sources
//! deterministic.

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::kind::ReaderKind;
use super::FormatRegistry;
use crate::error::RegistryError;
use crate::format::ExtensionKey;

// =============================================================================
// PriorityBand
// =============================================================================

/// Named priority band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityBand {
    /// Readers written for one format family, with better metadata and chunking
    Specialized,
    /// Broad readers that may work for many formats
    Generic,
}

impl PriorityBand {
    pub const fn name(&self) -> &'static str {
        match self {
            PriorityBand::Specialized => "specialized",
            PriorityBand::Generic => "generic",
        }
    }
}

impl fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// BandPolicy
// =============================================================================

/// Tie-break rules applied on top of the route data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandPolicy {
    /// Overrides the band order declared by the data source.
    pub order: Option<Vec<PriorityBand>>,

    /// Readers moved to the front of their band, in this order.
    pub prefer: Vec<ReaderKind>,
}

impl BandPolicy {
    pub fn with_order(mut self, order: Vec<PriorityBand>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_preferred(mut self, reader: ReaderKind) -> Self {
        if !self.prefer.contains(&reader) {
            self.prefer.push(reader);
        }
        self
    }

    /// Stable partition: preferred readers first (in policy order), rest as listed.
    fn apply(&self, readers: &[ReaderKind]) -> Vec<ReaderKind> {
        let mut ordered: Vec<ReaderKind> = self
            .prefer
            .iter()
            .filter(|preferred| readers.contains(*preferred))
            .copied()
            .collect();
        ordered.extend(readers.iter().filter(|r| !self.prefer.contains(*r)));
        ordered
    }
}

// =============================================================================
// CandidateList
// =============================================================================

/// Ordered, non-empty, duplicate-free readers for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateList(Vec<ReaderKind>);

impl CandidateList {
    pub fn new(readers: Vec<ReaderKind>) -> Result<Self, RegistryError> {
        if readers.is_empty() {
            return Err(RegistryError::EmptyCandidates);
        }
        for (i, reader) in readers.iter().enumerate() {
            if readers[..i].contains(reader) {
                return Err(RegistryError::DuplicateReader(*reader));
            }
        }
        Ok(Self(readers))
    }

    /// Build from readers that may repeat, keeping each first occurrence.
    pub fn deduplicated<I: IntoIterator<Item = ReaderKind>>(
        readers: I,
    ) -> Result<Self, RegistryError> {
        let mut unique = Vec::new();
        for reader in readers {
            if !unique.contains(&reader) {
                unique.push(reader);
            }
        }
        Self::new(unique)
    }

    pub fn as_slice(&self) -> &[ReaderKind] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReaderKind> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> ReaderKind {
        self.0[0]
    }

    pub fn contains(&self, reader: ReaderKind) -> bool {
        self.0.contains(&reader)
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a ReaderKind;
    type IntoIter = std::slice::Iter<'a, ReaderKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CandidateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(ReaderKind::name).collect();
        f.write_str(&names.join(" -> "))
    }
}

// =============================================================================
// RegistryBuilder
// =============================================================================

/// Collects routes per band and produces an immutable [`FormatRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    bands: Vec<PriorityBand>,
    routes: BTreeMap<ExtensionKey, BTreeMap<PriorityBand, Vec<ReaderKind>>>,
    fallback: Vec<ReaderKind>,
    policy: BandPolicy,
}

impl RegistryBuilder {
    /// Create a builder with the given band order.
    pub fn new<I: IntoIterator<Item = PriorityBand>>(bands: I) -> Result<Self, RegistryError> {
        let mut order = Vec::new();
        for band in bands {
            if order.contains(&band) {
                return Err(RegistryError::DuplicateBand(band.to_string()));
            }
            order.push(band);
        }
        Ok(Self {
            bands: order,
            routes: BTreeMap::new(),
            fallback: Vec::new(),
            policy: BandPolicy::default(),
        })
    }

    /// Apply a tie-break policy. A policy band order replaces the current one.
    pub fn policy(mut self, policy: BandPolicy) -> Result<Self, RegistryError> {
        if let Some(order) = &policy.order {
            let rebuilt = Self::new(order.iter().copied())?;
            self.bands = rebuilt.bands;
        }
        self.policy = policy;
        Ok(self)
    }

    /// Append `readers` to `band` for every key in `extensions`.
    pub fn add_route<I>(
        &mut self,
        band: PriorityBand,
        extensions: I,
        readers: &[ReaderKind],
    ) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = ExtensionKey>,
    {
        if readers.is_empty() {
            return Err(RegistryError::EmptyRoute {
                band: band.to_string(),
            });
        }
        for key in extensions {
            self.routes
                .entry(key)
                .or_default()
                .entry(band)
                .or_default()
                .extend_from_slice(readers);
        }
        Ok(self)
    }

    /// Readers tried for inputs that have no extension at all.
    pub fn fallback(&mut self, readers: &[ReaderKind]) -> &mut Self {
        self.fallback = readers.to_vec();
        self
    }

    /// Concatenate bands per key and produce the registry.
    pub fn build(self) -> Result<FormatRegistry, RegistryError> {
        let mut routes = BTreeMap::new();

        for (key, by_band) in self.routes {
            if let Some(band) = by_band.keys().find(|b| !self.bands.contains(*b)) {
                return Err(RegistryError::UnorderedBand(band.to_string()));
            }

            let readers = self
                .bands
                .iter()
                .filter_map(|band| by_band.get(band))
                .flat_map(|readers| self.policy.apply(readers));

            routes.insert(key, CandidateList::deduplicated(readers)?);
        }

        let fallback = if self.fallback.is_empty() {
            None
        } else {
            Some(CandidateList::deduplicated(self.policy.apply(&self.fallback))?)
        };

        Ok(FormatRegistry::from_parts(routes, fallback, self.bands))
    }
}
