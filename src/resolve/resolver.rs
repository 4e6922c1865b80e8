use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::outcome::{Attempt, Plan, PlannedCandidate, Resolution, Route, SkipReason};
use crate::error::{RegistryError, ResolveError};
use crate::format::{ExtensionKey, ExtensionNormalizer};
use crate::readers::{InputDescriptor, ReaderSet};
use crate::registry::{Availability, CandidateList, DependencyAdvisor, FormatRegistry, ReaderKind};

/// Default upper bound on a single capability check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Picks the first reader, in registry priority order, that accepts an input.
///
/// All state is immutable and shared; cloning a resolver is cheap and
/// concurrent resolutions never interfere.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<FormatRegistry>,
    readers: Arc<ReaderSet>,
    advisor: Arc<DependencyAdvisor>,
    normalizer: Arc<ExtensionNormalizer>,
    check_timeout: Option<Duration>,
}

enum CheckOutcome {
    Accepted,
    Skipped(SkipReason),
}

impl Resolver {
    /// Create a resolver. Capability checks run without a timeout until
    /// [`Resolver::with_check_timeout`] is called.
    pub fn new(
        registry: impl Into<Arc<FormatRegistry>>,
        readers: impl Into<Arc<ReaderSet>>,
        advisor: impl Into<Arc<DependencyAdvisor>>,
    ) -> Self {
        let registry = registry.into();
        let normalizer = Arc::new(registry.normalizer());
        Self {
            registry,
            readers: readers.into(),
            advisor: advisor.into(),
            normalizer,
            check_timeout: None,
        }
    }

    /// Built-in registry, every compiled reader, built-in install hints and
    /// the default check timeout.
    pub fn builtin() -> Result<Self, RegistryError> {
        let registry = FormatRegistry::builtin()?.clone();
        Ok(Self::new(registry, ReaderSet::builtin(), DependencyAdvisor::builtin())
            .with_check_timeout(DEFAULT_CHECK_TIMEOUT))
    }

    /// Bound every `can_read` call. A check that overruns is skipped as
    /// [`SkipReason::TimedOut`] and the next candidate is tried.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    pub fn without_check_timeout(mut self) -> Self {
        self.check_timeout = None;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn readers(&self) -> &ReaderSet {
        &self.readers
    }

    pub fn advisor(&self) -> &DependencyAdvisor {
        &self.advisor
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout
    }

    /// How `input` is routed, without consulting the registry.
    pub fn route(&self, input: &InputDescriptor) -> Route {
        match input {
            InputDescriptor::ArrayLike(_) => Route::ArrayLike,
            InputDescriptor::File(reader) => {
                match self.normalizer.raw_extension(reader.identifier()) {
                    Some(raw) => match ExtensionKey::new(raw.as_str()) {
                        Ok(key) => Route::Extension(key),
                        Err(_) => Route::Unrecognized(raw),
                    },
                    None => Route::NoExtension,
                }
            }
        }
    }

    fn candidates(&self, input: &InputDescriptor) -> Result<(Route, &CandidateList), ResolveError> {
        let route = self.route(input);
        let candidates = match &route {
            Route::Extension(key) => self.registry.lookup(key),
            Route::ArrayLike => self.registry.lookup(&ExtensionKey::array_like()),
            Route::NoExtension => self.registry.fallback(),
            Route::Unrecognized(_) => None,
        };

        match candidates {
            Some(candidates) => Ok((route, candidates)),
            None => Err(ResolveError::UnsupportedFormat {
                extension: route.extension(),
            }),
        }
    }

    /// Ordered candidates for `input` with their availability. No I/O.
    pub fn plan(&self, input: &InputDescriptor) -> Result<Plan, ResolveError> {
        let (route, candidates) = self.candidates(input)?;
        let candidates = candidates
            .iter()
            .map(|&reader| PlannedCandidate {
                reader,
                install_group: self.advisor.install_hint(reader),
                available: self.advisor.is_available(reader),
                has_backend: self.readers.contains(reader),
            })
            .collect();
        Ok(Plan { route, candidates })
    }

    /// Resolve `input` to the first candidate that accepts it.
    ///
    /// Candidates whose install group is missing are skipped without calling
    /// `can_read`. A failing or overrunning check only skips that candidate.
    pub async fn resolve(&self, input: &InputDescriptor) -> Result<Resolution, ResolveError> {
        let (route, candidates) = self.candidates(input)?;
        debug!(
            input = input.name(),
            route = %route,
            candidates = %candidates,
            "Resolving reader"
        );

        let mut skipped = Vec::new();
        for (index, &reader) in candidates.iter().enumerate() {
            match self.check(reader, input).await {
                CheckOutcome::Accepted => {
                    info!(
                        input = input.name(),
                        reader = %reader,
                        skipped = skipped.len(),
                        "Reader selected"
                    );
                    return Ok(Resolution {
                        reader,
                        route,
                        skipped,
                        untried: candidates.as_slice()[index + 1..].to_vec(),
                    });
                }
                CheckOutcome::Skipped(reason) => skipped.push(Attempt::new(reader, reason)),
            }
        }

        Err(exhausted(route, skipped))
    }

    /// Resolve independent inputs concurrently. Results are in input order.
    ///
    /// A task cancelled by the runtime yields [`ResolveError::Cancelled`] for
    /// its input; a panicking check is propagated to the caller.
    pub async fn resolve_all(
        &self,
        inputs: Vec<InputDescriptor>,
    ) -> Vec<Result<Resolution, ResolveError>> {
        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let resolver = self.clone();
                tokio::spawn(async move { resolver.resolve(&input).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    warn!(error = %e, "Resolution task cancelled");
                    results.push(Err(ResolveError::Cancelled));
                }
            }
        }
        results
    }

    async fn check(&self, reader: ReaderKind, input: &InputDescriptor) -> CheckOutcome {
        if let Availability::Missing(install_group) = self.advisor.availability(reader) {
            debug!(
                reader = %reader,
                install_group = %install_group,
                "Skipping reader, install group not available"
            );
            return CheckOutcome::Skipped(SkipReason::MissingOptionalDependency { install_group });
        }

        let Some(backend) = self.readers.get(reader) else {
            debug!(reader = %reader, "Skipping reader, no backend registered");
            return CheckOutcome::Skipped(SkipReason::NoBackend);
        };

        let result = match self.check_timeout {
            Some(limit) => match tokio::time::timeout(limit, backend.can_read(input)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        input = input.name(),
                        reader = %reader,
                        timeout_ms = limit.as_millis() as u64,
                        "Capability check timed out"
                    );
                    return CheckOutcome::Skipped(SkipReason::timed_out(limit));
                }
            },
            None => backend.can_read(input).await,
        };

        match result {
            Ok(true) => CheckOutcome::Accepted,
            Ok(false) => {
                debug!(input = input.name(), reader = %reader, "Reader rejected input");
                CheckOutcome::Skipped(SkipReason::Rejected)
            }
            Err(e) => {
                warn!(
                    input = input.name(),
                    reader = %reader,
                    error = %e,
                    "Capability check failed"
                );
                CheckOutcome::Skipped(SkipReason::CapabilityCheckFailed {
                    cause: e.to_string(),
                })
            }
        }
    }
}

fn exhausted(route: Route, attempted: Vec<Attempt>) -> ResolveError {
    let extension = route.extension();
    let first_missing = attempted
        .first()
        .and_then(|first| first.install_group().map(|group| (first.reader, group)));

    match first_missing {
        Some((reader, install_group))
            if attempted.iter().all(|a| a.install_group().is_some()) =>
        {
            ResolveError::MissingOptionalDependency {
                extension,
                reader,
                install_group,
                attempted,
            }
        }
        _ => ResolveError::NoReaderAccepted {
            extension,
            attempted,
        },
    }
}
