//! Reader resolution: route an input to its candidates and pick the first
//! one that accepts it.
//!
//! ```text
//! InputDescriptor ──► Route ──► CandidateList ──► per candidate:
//!                                                  advisor: missing? ─► skip
//!                                                  backend: absent?  ─► skip
//!                                                  can_read          ─► accept / skip
//! ```

mod outcome;
mod resolver;

pub use outcome::{Attempt, Plan, PlannedCandidate, Resolution, Route, SkipReason};
pub use resolver::{Resolver, DEFAULT_CHECK_TIMEOUT};
