//! Values produced by a resolution.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::format::ExtensionKey;
use crate::registry::{InstallGroup, ReaderKind};

/// How an input was routed to a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// By normalized extension
    Extension(ExtensionKey),
    /// In-memory array, reserved `array-like` key
    ArrayLike,
    /// File name without extension, registry fallback list
    NoExtension,
    /// Extension text that cannot be a registry key (`png `); never routed
    Unrecognized(String),
}

impl Route {
    /// Extension text used in error messages (empty for [`Route::NoExtension`]).
    pub fn extension(&self) -> String {
        match self {
            Route::Extension(key) => key.to_string(),
            Route::ArrayLike => ExtensionKey::array_like().to_string(),
            Route::NoExtension => String::new(),
            Route::Unrecognized(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Extension(key) => write!(f, "{}", key),
            Route::ArrayLike => write!(f, "{}", ExtensionKey::array_like()),
            Route::NoExtension => f.write_str("<no extension>"),
            Route::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a candidate did not become the chosen reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// `can_read` returned false
    Rejected,
    /// The reader's optional dependency is not installed; `can_read` not called
    MissingOptionalDependency { install_group: InstallGroup },
    /// `can_read` itself failed
    CapabilityCheckFailed { cause: String },
    /// `can_read` did not finish within the configured timeout
    TimedOut { after_ms: u64 },
    /// No capability-check backend is registered for the reader
    NoBackend,
}

impl SkipReason {
    pub(crate) fn timed_out(after: Duration) -> Self {
        SkipReason::TimedOut {
            after_ms: after.as_millis() as u64,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Rejected => f.write_str("rejected"),
            SkipReason::MissingOptionalDependency { install_group } => {
                write!(f, "not installed, requires install group '{}'", install_group)
            }
            SkipReason::CapabilityCheckFailed { cause } => {
                write!(f, "capability check failed: {}", cause)
            }
            SkipReason::TimedOut { after_ms } => {
                write!(f, "capability check timed out after {}ms", after_ms)
            }
            SkipReason::NoBackend => f.write_str("no backend registered"),
        }
    }
}

/// One skipped candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub reader: ReaderKind,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Attempt {
    pub fn new(reader: ReaderKind, reason: SkipReason) -> Self {
        Self { reader, reason }
    }

    pub fn rejected(reader: ReaderKind) -> Self {
        Self::new(reader, SkipReason::Rejected)
    }

    /// Install group that would have made this candidate usable.
    pub fn install_group(&self) -> Option<InstallGroup> {
        match self.reason {
            SkipReason::MissingOptionalDependency { install_group } => Some(install_group),
            _ => None,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reader, self.reason)
    }
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The first candidate that accepted the input
    pub reader: ReaderKind,
    pub route: Route,
    /// Candidates before `reader`, with the reason each was passed over
    pub skipped: Vec<Attempt>,
    /// Candidates after `reader` that were never consulted
    pub untried: Vec<ReaderKind>,
}

/// A candidate as seen before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCandidate {
    pub reader: ReaderKind,
    pub install_group: Option<InstallGroup>,
    /// The advisor does not know the install group to be missing
    pub available: bool,
    /// A capability-check backend is registered
    pub has_backend: bool,
}

impl PlannedCandidate {
    /// Whether the resolver would call `can_read` for this candidate.
    pub fn will_check(&self) -> bool {
        self.available && self.has_backend
    }
}

/// Ordered candidates for an input, without running capability checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub route: Route,
    pub candidates: Vec<PlannedCandidate>,
}
