//! Maps readers to the optional install group that backs them.

use std::collections::{BTreeMap, BTreeSet};

use super::kind::{InstallGroup, ReaderKind};
use crate::error::RegistryError;

/// Whether a reader can be attempted in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Missing(InstallGroup),
}

/// Install hints and known-missing groups.
///
/// Immutable once built; the resolver consults it before any I/O so a reader
/// whose backend is absent is never asked to check an input.
#[derive(Debug, Clone, Default)]
pub struct DependencyAdvisor {
    hints: BTreeMap<ReaderKind, InstallGroup>,
    unavailable: BTreeSet<InstallGroup>,
}

impl DependencyAdvisor {
    /// An advisor with no hints: every reader counts as always available.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hints from [`ReaderKind::install_group`], with groups whose cargo
    /// feature is disabled marked unavailable.
    pub fn builtin() -> Self {
        let hints: BTreeMap<_, _> = ReaderKind::ALL
            .iter()
            .filter_map(|kind| kind.install_group().map(|group| (*kind, group)))
            .collect();
        let unavailable = hints
            .values()
            .filter(|group| !group.is_compiled())
            .copied()
            .collect();
        Self { hints, unavailable }
    }

    /// Register the install group for a reader.
    ///
    /// A reader has at most one group; registering a different one fails.
    pub fn with_hint(mut self, reader: ReaderKind, group: InstallGroup) -> Result<Self, RegistryError> {
        match self.hints.get(&reader) {
            Some(existing) if *existing != group => Err(RegistryError::ConflictingHint {
                reader,
                existing: *existing,
                requested: group,
            }),
            _ => {
                self.hints.insert(reader, group);
                Ok(self)
            }
        }
    }

    /// Mark a group as not installed.
    pub fn with_unavailable(mut self, group: InstallGroup) -> Self {
        self.unavailable.insert(group);
        self
    }

    /// Install group needed by `reader`, if it has one.
    pub fn install_hint(&self, reader: ReaderKind) -> Option<InstallGroup> {
        self.hints.get(&reader).copied()
    }

    pub fn availability(&self, reader: ReaderKind) -> Availability {
        match self.install_hint(reader) {
            Some(group) if self.unavailable.contains(&group) => Availability::Missing(group),
            _ => Availability::Available,
        }
    }

    pub fn is_available(&self, reader: ReaderKind) -> bool {
        self.availability(reader) == Availability::Available
    }

    /// Groups currently marked unavailable.
    pub fn unavailable_groups(&self) -> impl Iterator<Item = InstallGroup> + '_ {
        self.unavailable.iter().copied()
    }
}
